//! AccessGate — allow/deny decisions for protected regions
//!
//! A protected view describes its requirements as a [`Protection`] and
//! branches on the [`GateOutcome`] the gate returns. Denials are ordinary
//! values to render (a login redirect, a "no access" panel); the only error
//! a gate evaluation can produce is a role missing from the catalog.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Permission, PermissionCatalog};
use crate::directory::Role;
use crate::error::Result;
use crate::session::SessionHandle;

/// Requirements for entering a protected region
#[derive(Debug, Clone, Default)]
pub struct Protection {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
}

impl Protection {
    /// No requirements beyond an authenticated session
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the actor's role to be one of the listed roles
    pub fn require_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Require a permission token. Listing several requires all of them.
    pub fn require_permission(mut self, token: Permission) -> Self {
        self.permissions.push(token);
        self
    }
}

/// What a gate evaluation decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    /// No authenticated session; send the caller to login
    Unauthenticated,
    /// Authenticated, but the role is not in the required set
    InsufficientRole,
    /// Authenticated with an accepted role, but missing a required token
    AccessDenied,
    /// All checks passed; the guarded content may render
    Authorized,
}

impl GateOutcome {
    /// Only this outcome releases the guarded content
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateOutcome::Authorized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateOutcome::Unauthenticated => "unauthenticated",
            GateOutcome::InsufficientRole => "insufficient_role",
            GateOutcome::AccessDenied => "access_denied",
            GateOutcome::Authorized => "authorized",
        }
    }
}

impl std::fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluates [`Protection`] requirements against the live session
pub struct AccessGate {
    catalog: PermissionCatalog,
    session: SessionHandle,
}

impl AccessGate {
    pub fn new(catalog: PermissionCatalog, session: SessionHandle) -> Self {
        Self { catalog, session }
    }

    /// Evaluate protection requirements against the current session.
    ///
    /// Checks run in a fixed order and the first failure wins: startup
    /// loading (awaited, never bypassed), authentication, role membership,
    /// then each required permission token. Expired sessions fail the
    /// authentication check like any other signed-out state.
    pub async fn evaluate(&self, protection: &Protection) -> Result<GateOutcome> {
        self.session.await_ready().await;

        let Some(actor) = self.session.current_actor().await else {
            return Ok(GateOutcome::Unauthenticated);
        };

        if !protection.roles.is_empty() && !protection.roles.contains(&actor.role) {
            debug!(
                actor_id = %actor.id,
                role = %actor.role,
                "gate refused: role not in required set"
            );
            return Ok(GateOutcome::InsufficientRole);
        }

        if !protection.permissions.is_empty() {
            let grants = self.catalog.permissions_for(actor.role)?;
            for token in &protection.permissions {
                if !grants.contains(token) {
                    debug!(
                        actor_id = %actor.id,
                        token = %token,
                        "gate refused: missing permission"
                    );
                    return Ok(GateOutcome::AccessDenied);
                }
            }
        }

        Ok(GateOutcome::Authorized)
    }
}
