//! # hrdesk-access
//!
//! Access-control and session-lifecycle core for the HRDesk console.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    hrdesk-access                    │
//! ├────────────────┬────────────────┬───────────────────┤
//! │   AccessGate   │   Visibility   │    Permission     │
//! │  (role/token   │   & edit       │    Catalog        │
//! │   guard for    │   scoping      │   (role → token   │
//! │   protected    │                │    grants)        │
//! │   regions)     │                │                   │
//! ├────────────────┴────────────────┴───────────────────┤
//! │                   SessionActor                      │
//! │   (identity, TTL countdown, renewal, lifecycle      │
//! │    events, persisted marker)                        │
//! ├─────────────────────────────────────────────────────┤
//! │   Collaborators: ActorDirectory, CredentialStore,   │
//! │   MarkerStore                                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hrdesk_access::session::JsonMarkerFile;
//! use hrdesk_access::{
//!     AccessConfig, AccessGate, Permission, PermissionCatalog, Protection, Role,
//!     SeededDirectory, SessionActor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> hrdesk_access::Result<()> {
//!     let config = AccessConfig::new("/var/lib/hrdesk");
//!     let directory = Arc::new(SeededDirectory::new());
//!     let marker = Box::new(JsonMarkerFile::new(config.marker_path()));
//!     let session = SessionActor::spawn(config, directory.clone(), directory, marker);
//!
//!     session.restore_session().await;
//!     session
//!         .login("dana.whitfield@hrdesk.io".into(), "Adm1n!Desk".into())
//!         .await?;
//!
//!     let gate = AccessGate::new(PermissionCatalog::default(), session.clone());
//!     let outcome = gate
//!         .evaluate(
//!             &Protection::new()
//!                 .require_role(Role::Admin)
//!                 .require_permission(Permission::TEAM_EDIT_ALL),
//!         )
//!         .await?;
//!     assert!(outcome.is_authorized());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Deny-by-default permission catalog**: role-to-token grants, loud on
//!   misconfiguration
//! - **Role-scoped visibility**: admins and HR see everyone, managers their
//!   direct reports, employees themselves
//! - **Session countdown**: deterministic TTL state machine with advisory
//!   and blocking warning thresholds
//! - **Session restore**: wall-clock resume from a persisted marker after a
//!   process restart
//! - **Access gate**: ordered loading/authentication/role/permission checks
//!   returning outcomes, not panics
//! - **`seed` feature** (default): in-memory demo org with credentials

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod gate;
pub mod scope;
pub mod session;

pub use catalog::{Permission, PermissionCatalog};
pub use config::AccessConfig;
#[cfg(feature = "seed")]
pub use directory::SeededDirectory;
pub use directory::{provision_actor, Actor, ActorDirectory, ActorStatus, CredentialStore, Role};
pub use error::{AccessError, Result};
pub use gate::{AccessGate, GateOutcome, Protection};
pub use scope::{
    can_change_access, can_edit_actor, visible_actors, visible_documents, visible_tasks, Document,
    OnboardingTask, VisibilityScope,
};
pub use session::{
    ClockPhase, SessionActor, SessionClock, SessionEvent, SessionHandle, SessionMarker,
};
