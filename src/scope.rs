//! Visibility and edit scoping
//!
//! Every "who can see or edit whom" decision funnels through this module.
//! View code never branches on [`Role`] directly: it calls
//! [`visible_actors`], [`can_edit_actor`] or [`can_change_access`] and renders
//! whatever comes back. The same functions answer both rendering and
//! mutation-time checks, so an affordance never appears that the mutation
//! path would refuse.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Permission, PermissionCatalog};
use crate::directory::{Actor, ActorDirectory, Role};
use crate::error::Result;

/// How far a role sees into the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// The whole directory
    All,
    /// Self plus direct reports
    DirectReports,
    /// Self only
    SelfOnly,
}

impl Role {
    /// The one place role identity maps to a visibility scope
    pub fn scope(self) -> VisibilityScope {
        match self {
            Role::Admin | Role::Hr => VisibilityScope::All,
            Role::Manager => VisibilityScope::DirectReports,
            Role::Employee => VisibilityScope::SelfOnly,
        }
    }
}

/// Filter `all` down to the actors `current` may see, preserving input order.
///
/// A manager's own record is included even when missing from the input; a
/// manager with no resolvable reports sees only themself.
pub fn visible_actors(current: &Actor, all: &[Actor], directory: &dyn ActorDirectory) -> Vec<Actor> {
    match current.role.scope() {
        VisibilityScope::All => all.to_vec(),
        VisibilityScope::SelfOnly => vec![current.clone()],
        VisibilityScope::DirectReports => {
            let mut visible: Vec<Actor> = all
                .iter()
                .filter(|actor| owner_in_scope(current, &actor.id, directory))
                .cloned()
                .collect();
            if !visible.iter().any(|actor| actor.id == current.id) {
                visible.insert(0, current.clone());
            }
            visible
        }
    }
}

/// Whether a record owned by `owner_id` falls inside `current`'s scope.
/// Self always counts as in scope.
fn owner_in_scope(current: &Actor, owner_id: &str, directory: &dyn ActorDirectory) -> bool {
    match current.role.scope() {
        VisibilityScope::All => true,
        VisibilityScope::SelfOnly => owner_id == current.id,
        VisibilityScope::DirectReports => {
            owner_id == current.id
                || directory.reports_to(owner_id).as_deref() == Some(current.id.as_str())
        }
    }
}

/// Whether `current` may edit `target`'s record.
///
/// The decision composes the permission token with visibility scope.
/// Unscoped tokens (`team_edit`, `team_edit_all`) cover any target;
/// `team_edit_own` covers targets inside the current scope. Editing one's
/// own record requires `team_edit_self` explicitly. Role and status
/// changes are not covered here; those go through [`can_change_access`].
///
/// `None` (no authenticated actor) can edit nothing. The only error is a
/// role missing from the catalog.
pub fn can_edit_actor(
    catalog: &PermissionCatalog,
    directory: &dyn ActorDirectory,
    current: Option<&Actor>,
    target: &Actor,
) -> Result<bool> {
    let Some(current) = current else {
        return Ok(false);
    };
    let grants = catalog.permissions_for(current.role)?;

    if grants.contains(&Permission::TEAM_EDIT_ALL) || grants.contains(&Permission::TEAM_EDIT) {
        return Ok(true);
    }

    // Self-edit is a separate capability; scoped tokens never imply it.
    if current.id == target.id {
        return Ok(grants.contains(&Permission::TEAM_EDIT_SELF));
    }

    if grants.contains(&Permission::TEAM_EDIT_OWN) && owner_in_scope(current, &target.id, directory) {
        return Ok(true);
    }

    debug!(
        actor_id = %current.id,
        target_id = %target.id,
        "edit denied: no token covers this target"
    );
    Ok(false)
}

/// Whether `current` may change `target`'s role or account status.
pub fn can_change_access(
    catalog: &PermissionCatalog,
    current: Option<&Actor>,
    target: &Actor,
) -> Result<bool> {
    let Some(current) = current else {
        return Ok(false);
    };
    let allowed = catalog
        .permissions_for(current.role)?
        .contains(&Permission::ACCESS_CONTROL_EDIT);
    if !allowed {
        debug!(
            actor_id = %current.id,
            target_id = %target.id,
            "access-control change denied"
        );
    }
    Ok(allowed)
}

// ─── Owned targets ───

/// An onboarding checklist item assigned to an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingTask {
    pub id: String,
    pub title: String,
    /// The actor this task belongs to
    pub assignee_id: String,
    pub completed: bool,
}

/// A stored document owned by an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    /// The actor this document belongs to
    pub owner_id: String,
}

/// The onboarding tasks whose assignee falls inside `current`'s scope
pub fn visible_tasks(
    current: &Actor,
    tasks: &[OnboardingTask],
    directory: &dyn ActorDirectory,
) -> Vec<OnboardingTask> {
    tasks
        .iter()
        .filter(|task| owner_in_scope(current, &task.assignee_id, directory))
        .cloned()
        .collect()
}

/// The documents whose owner falls inside `current`'s scope
pub fn visible_documents(
    current: &Actor,
    documents: &[Document],
    directory: &dyn ActorDirectory,
) -> Vec<Document> {
    documents
        .iter()
        .filter(|doc| owner_in_scope(current, &doc.owner_id, directory))
        .cloned()
        .collect()
}
