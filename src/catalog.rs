//! Permission catalog — the single source of truth for role grants
//!
//! Maps each [`Role`] to its set of permission tokens. Semantics are
//! deny-by-default: a token absent from a role's set is denied, and an
//! unauthenticated caller holds no tokens at all. Call sites never hard-code
//! role checks for capabilities; they ask the catalog.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::directory::{Actor, Role};
use crate::error::{AccessError, Result};

/// An opaque capability token.
///
/// Tokens are plain strings so new capabilities can ship without touching
/// this crate's types; the catalog is where they gain meaning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Provision new employee accounts
    pub const TEAM_ADD_EMPLOYEE: Permission = Permission(Cow::Borrowed("team_add_employee"));
    /// Edit any team member record, unscoped
    pub const TEAM_EDIT: Permission = Permission(Cow::Borrowed("team_edit"));
    /// Edit records of direct reports
    pub const TEAM_EDIT_OWN: Permission = Permission(Cow::Borrowed("team_edit_own"));
    /// Edit every record in the directory
    pub const TEAM_EDIT_ALL: Permission = Permission(Cow::Borrowed("team_edit_all"));
    /// Edit one's own profile fields
    pub const TEAM_EDIT_SELF: Permission = Permission(Cow::Borrowed("team_edit_self"));
    /// Upload documents
    pub const DOCUMENTS_UPLOAD: Permission = Permission(Cow::Borrowed("documents_upload"));
    /// Delete documents
    pub const DOCUMENTS_DELETE: Permission = Permission(Cow::Borrowed("documents_delete"));
    /// Change another actor's role or account status
    pub const ACCESS_CONTROL_EDIT: Permission = Permission(Cow::Borrowed("access_control_edit"));

    /// A token outside the built-in set
    pub fn new(token: impl Into<String>) -> Self {
        Permission(Cow::Owned(token.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role-to-token grant table
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    grants: HashMap<Role, BTreeSet<Permission>>,
}

impl PermissionCatalog {
    /// A catalog with no roles registered. Build it up with
    /// [`register_role`](Self::register_role) and [`grant`](Self::grant).
    pub fn empty() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// Register a role with an empty grant set (idempotent)
    pub fn register_role(&mut self, role: Role) {
        self.grants.entry(role).or_default();
    }

    /// Grant a token to a role
    pub fn grant(&mut self, role: Role, token: Permission) {
        self.grants.entry(role).or_default().insert(token);
    }

    /// The full grant set for a role, in stable order.
    ///
    /// A role missing from the catalog is a configuration error, not an
    /// empty grant set.
    pub fn permissions_for(&self, role: Role) -> Result<&BTreeSet<Permission>> {
        self.grants.get(&role).ok_or_else(|| AccessError::UnknownRole {
            role: role.as_str().to_string(),
        })
    }

    /// Whether the actor holds a token. `None` (no authenticated actor)
    /// holds nothing; a catalog miss is logged and denied.
    pub fn has_permission(&self, actor: Option<&Actor>, token: &Permission) -> bool {
        let Some(actor) = actor else {
            return false;
        };
        match self.permissions_for(actor.role) {
            Ok(tokens) => tokens.contains(token),
            Err(e) => {
                error!(role = %actor.role, error = %e, "permission catalog has no entry for role");
                false
            }
        }
    }
}

impl Default for PermissionCatalog {
    /// The built-in grant table of the console
    fn default() -> Self {
        let mut catalog = Self::empty();

        for token in [
            Permission::TEAM_ADD_EMPLOYEE,
            Permission::TEAM_EDIT,
            Permission::TEAM_EDIT_OWN,
            Permission::TEAM_EDIT_ALL,
            Permission::TEAM_EDIT_SELF,
            Permission::DOCUMENTS_UPLOAD,
            Permission::DOCUMENTS_DELETE,
            Permission::ACCESS_CONTROL_EDIT,
        ] {
            catalog.grant(Role::Admin, token);
        }

        for token in [Permission::TEAM_ADD_EMPLOYEE, Permission::DOCUMENTS_UPLOAD] {
            catalog.grant(Role::Hr, token);
        }

        for token in [
            Permission::TEAM_EDIT_OWN,
            Permission::TEAM_EDIT_SELF,
            Permission::DOCUMENTS_UPLOAD,
        ] {
            catalog.grant(Role::Manager, token);
        }

        for token in [Permission::TEAM_EDIT_SELF, Permission::DOCUMENTS_UPLOAD] {
            catalog.grant(Role::Employee, token);
        }

        catalog
    }
}
