//! Actor directory — identities, roles, and credential verification
//!
//! The session core never owns the employee roster; it talks to the
//! [`ActorDirectory`] and [`CredentialStore`] traits. The [`SeededDirectory`]
//! (behind the `seed` feature, on by default) implements both with a small
//! in-memory org for demos and tests.

#[cfg(feature = "seed")]
use std::collections::HashMap;
use std::str::FromStr;
#[cfg(feature = "seed")]
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "seed")]
use sha2::{Digest, Sha256};
#[cfg(feature = "seed")]
use tracing::debug;
use uuid::Uuid;

use crate::error::{AccessError, Result};

// ─── Roles ───

/// The closed set of console roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// HR operations: onboarding and document intake across the whole org
    Hr,
    /// Team lead with authority over direct reports
    Manager,
    /// Regular employee
    Employee,
}

impl Role {
    /// Every role, for iteration over the full set
    pub const ALL: [Role; 4] = [Role::Admin, Role::Hr, Role::Manager, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl FromStr for Role {
    type Err = AccessError;

    /// Parse a role string (case-insensitive). An unrecognized string is an
    /// error; it never falls back to some least-privileged default.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "hr" => Ok(Role::Hr),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            _ => Err(AccessError::UnknownRole { role: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Actors ───

/// Account lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorStatus {
    /// May hold a session
    Active,
    /// Deactivated account; logins fail
    Inactive,
    /// Provisioned but not yet onboarded; logins fail
    Pending,
}

impl ActorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorStatus::Active => "active",
            ActorStatus::Inactive => "inactive",
            ActorStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for ActorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A console user: employee, manager, HR staff, or admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Login identifier, unique across the directory
    pub email: String,
    pub role: Role,
    pub department: String,
    pub status: ActorStatus,
    /// Optional avatar asset reference
    pub avatar: Option<String>,
}

/// Create a new actor record for account provisioning.
///
/// The actor starts out [`ActorStatus::Pending`] with a fresh UUID; it cannot
/// log in until activated.
pub fn provision_actor(
    name: impl Into<String>,
    email: impl Into<String>,
    role: Role,
    department: impl Into<String>,
) -> Actor {
    Actor {
        id: Uuid::new_v4().to_string(),
        name: name.into(),
        email: email.into(),
        role,
        department: department.into(),
        status: ActorStatus::Pending,
        avatar: None,
    }
}

// ─── Collaborator traits ───

/// Read access to the employee roster and reporting lines
pub trait ActorDirectory: Send + Sync {
    /// Every actor in the directory, in stable order
    fn all_actors(&self) -> Vec<Actor>;

    fn find_by_id(&self, id: &str) -> Option<Actor>;

    fn find_by_email(&self, email: &str) -> Option<Actor>;

    /// The manager an actor reports to, if the reporting line is known
    fn reports_to(&self, actor_id: &str) -> Option<String>;
}

/// Credential verification, an async boundary toward whatever backend holds
/// the secrets
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Return the matching actor, or `None` for any kind of mismatch. The
    /// session core treats every `None` identically.
    async fn verify(&self, email: &str, password: &str) -> Option<Actor>;
}

// ─── Seeded directory ───

#[cfg(feature = "seed")]
struct StoredCredential {
    actor_id: String,
    password_digest: String,
}

#[cfg(feature = "seed")]
#[derive(Default)]
struct DirectoryInner {
    actors: Vec<Actor>,
    /// report id -> manager id
    managers: HashMap<String, String>,
    /// email -> credential
    credentials: HashMap<String, StoredCredential>,
}

/// In-memory directory pre-loaded with a small demo org.
///
/// Seeded actors carry fixed ids so a persisted session marker survives a
/// process restart. Passwords are stored as SHA-256 digests; this is demo
/// data, not a password vault.
#[cfg(feature = "seed")]
pub struct SeededDirectory {
    inner: RwLock<DirectoryInner>,
}

#[cfg(feature = "seed")]
impl SeededDirectory {
    pub fn new() -> Self {
        let dir = Self {
            inner: RwLock::new(DirectoryInner::default()),
        };

        dir.register(
            seed_actor("emp-001", "Dana Whitfield", "dana.whitfield@hrdesk.io", Role::Admin, "Operations"),
            "Adm1n!Desk",
        );
        dir.register(
            seed_actor("emp-002", "Priya Raman", "priya.raman@hrdesk.io", Role::Hr, "People"),
            "Peopl3!First",
        );
        dir.register(
            seed_actor("emp-003", "Marcus Vale", "marcus.vale@hrdesk.io", Role::Manager, "Engineering"),
            "Lead!Crew42",
        );
        dir.register(
            seed_actor("emp-004", "Elena Brandt", "elena.brandt@hrdesk.io", Role::Employee, "Engineering"),
            "Brandt!2026",
        );
        dir.register(
            seed_actor("emp-005", "Tomas Ried", "tomas.ried@hrdesk.io", Role::Employee, "Engineering"),
            "Ried!2026",
        );
        dir.register(
            seed_actor("emp-006", "Ingrid Solberg", "ingrid.solberg@hrdesk.io", Role::Employee, "Finance"),
            "Solberg!2026",
        );

        let mut deactivated =
            seed_actor("emp-007", "Felix Marsh", "felix.marsh@hrdesk.io", Role::Employee, "Engineering");
        deactivated.status = ActorStatus::Inactive;
        dir.register(deactivated, "Marsh!2026");

        dir.set_manager("emp-004", "emp-003");
        dir.set_manager("emp-005", "emp-003");

        dir
    }

    /// Add an actor with a login credential. An existing actor with the same
    /// id or email is replaced.
    pub fn register(&self, actor: Actor, password: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner
            .actors
            .retain(|a| a.id != actor.id && a.email != actor.email);
        inner.credentials.insert(
            actor.email.clone(),
            StoredCredential {
                actor_id: actor.id.clone(),
                password_digest: digest(password),
            },
        );
        inner.actors.push(actor);
    }

    /// Record that `report_id` reports to `manager_id`
    pub fn set_manager(&self, report_id: &str, manager_id: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner
            .managers
            .insert(report_id.to_string(), manager_id.to_string());
    }
}

#[cfg(feature = "seed")]
impl Default for SeededDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "seed")]
impl ActorDirectory for SeededDirectory {
    fn all_actors(&self) -> Vec<Actor> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.actors.clone()
    }

    fn find_by_id(&self, id: &str) -> Option<Actor> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.actors.iter().find(|a| a.id == id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<Actor> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.actors.iter().find(|a| a.email == email).cloned()
    }

    fn reports_to(&self, actor_id: &str) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.managers.get(actor_id).cloned()
    }
}

#[cfg(feature = "seed")]
#[async_trait]
impl CredentialStore for SeededDirectory {
    async fn verify(&self, email: &str, password: &str) -> Option<Actor> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let credential = inner.credentials.get(email)?;
        if credential.password_digest != digest(password) {
            debug!(email = %email, "password digest mismatch");
            return None;
        }
        let actor_id = credential.actor_id.clone();
        inner.actors.iter().find(|a| a.id == actor_id).cloned()
    }
}

#[cfg(feature = "seed")]
fn seed_actor(id: &str, name: &str, email: &str, role: Role, department: &str) -> Actor {
    let avatar = name
        .split_whitespace()
        .next()
        .map(|first| format!("avatars/{}.png", first.to_lowercase()));
    Actor {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        department: department.to_string(),
        status: ActorStatus::Active,
        avatar,
    }
}

#[cfg(feature = "seed")]
fn digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}
