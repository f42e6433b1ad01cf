//! End-to-end gate scenarios plus visibility and edit-scope properties

use std::sync::Arc;

use tempfile::TempDir;
use tokio::time::{timeout, Duration};

use hrdesk_access::session::InMemoryMarkerStore;
use hrdesk_access::{
    can_change_access, can_edit_actor, provision_actor, visible_actors, AccessConfig, AccessError,
    AccessGate, ActorStatus, GateOutcome, Permission, PermissionCatalog, Protection, Role,
    ActorDirectory, SeededDirectory, SessionActor, SessionHandle,
};

const ADMIN_EMAIL: &str = "dana.whitfield@hrdesk.io";
const ADMIN_PASSWORD: &str = "Adm1n!Desk";
const HR_EMAIL: &str = "priya.raman@hrdesk.io";
const HR_PASSWORD: &str = "Peopl3!First";
const EMPLOYEE_EMAIL: &str = "elena.brandt@hrdesk.io";
const EMPLOYEE_PASSWORD: &str = "Brandt!2026";

fn spawn_session(dir: &TempDir) -> (SessionHandle, Arc<SeededDirectory>) {
    let directory = Arc::new(SeededDirectory::new());
    let handle = SessionActor::spawn(
        AccessConfig::new(dir.path()).with_session_ttl_secs(300),
        directory.clone(),
        directory.clone(),
        Box::new(InMemoryMarkerStore::new()),
    );
    (handle, directory)
}

async fn spawn_gate(dir: &TempDir) -> (AccessGate, SessionHandle, Arc<SeededDirectory>) {
    let (handle, directory) = spawn_session(dir);
    handle.restore_session().await;
    let gate = AccessGate::new(PermissionCatalog::default(), handle.clone());
    (gate, handle, directory)
}

// ─── Gate scenarios ───

#[tokio::test]
async fn test_admin_clears_role_and_permission_gate() {
    let dir = TempDir::new().unwrap();
    let (gate, handle, _) = spawn_gate(&dir).await;
    assert!(handle.login(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()).await.unwrap());

    let protection = Protection::new()
        .require_role(Role::Admin)
        .require_permission(Permission::TEAM_EDIT_ALL)
        .require_permission(Permission::ACCESS_CONTROL_EDIT);
    assert_eq!(gate.evaluate(&protection).await.unwrap(), GateOutcome::Authorized);
}

#[tokio::test]
async fn test_employee_is_refused_before_permissions_are_checked() {
    let dir = TempDir::new().unwrap();
    let (gate, handle, _) = spawn_gate(&dir).await;
    assert!(handle.login(EMPLOYEE_EMAIL.into(), EMPLOYEE_PASSWORD.into()).await.unwrap());

    // Role membership fails first even though the permission would too.
    let protection = Protection::new()
        .require_role(Role::Admin)
        .require_role(Role::Hr)
        .require_permission(Permission::TEAM_EDIT_ALL);
    assert_eq!(gate.evaluate(&protection).await.unwrap(), GateOutcome::InsufficientRole);
}

#[tokio::test]
async fn test_accepted_role_still_needs_the_tokens() {
    let dir = TempDir::new().unwrap();
    let (gate, handle, _) = spawn_gate(&dir).await;
    assert!(handle.login(HR_EMAIL.into(), HR_PASSWORD.into()).await.unwrap());

    // HR passes the role check but lacks the edit token.
    let protection = Protection::new()
        .require_role(Role::Hr)
        .require_permission(Permission::TEAM_EDIT);
    assert_eq!(gate.evaluate(&protection).await.unwrap(), GateOutcome::AccessDenied);

    // Conjunction: holding one of two required tokens is not enough.
    let conjunction = Protection::new()
        .require_permission(Permission::TEAM_ADD_EMPLOYEE)
        .require_permission(Permission::DOCUMENTS_DELETE);
    assert_eq!(gate.evaluate(&conjunction).await.unwrap(), GateOutcome::AccessDenied);
}

#[tokio::test]
async fn test_signed_out_caller_is_unauthenticated() {
    let dir = TempDir::new().unwrap();
    let (gate, _handle, _) = spawn_gate(&dir).await;

    assert_eq!(
        gate.evaluate(&Protection::new()).await.unwrap(),
        GateOutcome::Unauthenticated
    );
    assert_eq!(
        gate.evaluate(&Protection::new().require_role(Role::Admin)).await.unwrap(),
        GateOutcome::Unauthenticated
    );
}

#[tokio::test]
async fn test_logout_downgrades_outcome_immediately() {
    let dir = TempDir::new().unwrap();
    let (gate, handle, _) = spawn_gate(&dir).await;
    assert!(handle.login(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()).await.unwrap());

    let protection = Protection::new().require_role(Role::Admin);
    assert_eq!(gate.evaluate(&protection).await.unwrap(), GateOutcome::Authorized);

    handle.logout().await;
    assert_eq!(gate.evaluate(&protection).await.unwrap(), GateOutcome::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_downgrades_outcome() {
    let dir = TempDir::new().unwrap();
    let (gate, handle, _) = spawn_gate(&dir).await;
    assert!(handle.login(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()).await.unwrap());
    assert!(gate.evaluate(&Protection::new()).await.unwrap().is_authorized());

    tokio::time::advance(Duration::from_secs(300)).await;
    assert_eq!(
        gate.evaluate(&Protection::new()).await.unwrap(),
        GateOutcome::Unauthenticated
    );
}

#[tokio::test(start_paused = true)]
async fn test_gate_blocks_until_startup_state_resolves() {
    let dir = TempDir::new().unwrap();
    let (handle, _) = spawn_session(&dir);
    let gate = AccessGate::new(PermissionCatalog::default(), handle.clone());

    // No restore yet: evaluation must wait, not answer.
    let pending = timeout(Duration::from_millis(50), gate.evaluate(&Protection::new())).await;
    assert!(pending.is_err(), "gate answered while still loading");

    handle.restore_session().await;
    assert_eq!(
        gate.evaluate(&Protection::new()).await.unwrap(),
        GateOutcome::Unauthenticated
    );
}

#[tokio::test]
async fn test_catalog_miss_is_an_error_not_a_denial() {
    let dir = TempDir::new().unwrap();
    let (handle, _) = spawn_session(&dir);
    handle.restore_session().await;
    assert!(handle.login(EMPLOYEE_EMAIL.into(), EMPLOYEE_PASSWORD.into()).await.unwrap());

    let mut catalog = PermissionCatalog::empty();
    catalog.grant(Role::Admin, Permission::TEAM_EDIT_ALL);
    let gate = AccessGate::new(catalog, handle.clone());

    let result = gate
        .evaluate(&Protection::new().require_permission(Permission::DOCUMENTS_UPLOAD))
        .await;
    assert!(matches!(result, Err(AccessError::UnknownRole { .. })));
}

#[tokio::test]
async fn test_admin_can_provision_through_the_gate() {
    let dir = TempDir::new().unwrap();
    let (gate, handle, directory) = spawn_gate(&dir).await;
    assert!(handle.login(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()).await.unwrap());

    let protection = Protection::new().require_permission(Permission::TEAM_ADD_EMPLOYEE);
    assert!(gate.evaluate(&protection).await.unwrap().is_authorized());

    let recruit = provision_actor("Noor Haddad", "noor.haddad@hrdesk.io", Role::Employee, "Engineering");
    assert_eq!(recruit.status, ActorStatus::Pending);
    directory.register(recruit.clone(), "Welcome!2026");

    assert_eq!(
        directory.find_by_email("noor.haddad@hrdesk.io").map(|a| a.id),
        Some(recruit.id)
    );
}

// ─── Visibility properties ───

#[test]
fn test_employee_sees_only_themself() {
    let directory = SeededDirectory::new();
    let all = directory.all_actors();
    let elena = directory.find_by_email(EMPLOYEE_EMAIL).unwrap();

    let visible = visible_actors(&elena, &all, &directory);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, elena.id);
}

#[test]
fn test_admin_and_hr_see_the_whole_directory_in_order() {
    let directory = SeededDirectory::new();
    let all = directory.all_actors();

    for email in [ADMIN_EMAIL, HR_EMAIL] {
        let current = directory.find_by_email(email).unwrap();
        assert_eq!(visible_actors(&current, &all, &directory), all);
    }
}

#[test]
fn test_manager_sees_self_and_reports_only() {
    let directory = SeededDirectory::new();
    let all = directory.all_actors();
    let marcus = directory.find_by_email("marcus.vale@hrdesk.io").unwrap();

    let visible = visible_actors(&marcus, &all, &directory);
    let ids: Vec<&str> = visible.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["emp-003", "emp-004", "emp-005"]);
}

// ─── Edit scope properties ───

#[test]
fn test_edit_rights_compose_token_and_scope() {
    let directory = SeededDirectory::new();
    let catalog = PermissionCatalog::default();

    let admin = directory.find_by_email(ADMIN_EMAIL).unwrap();
    let hr = directory.find_by_email(HR_EMAIL).unwrap();
    let marcus = directory.find_by_email("marcus.vale@hrdesk.io").unwrap();
    let elena = directory.find_by_email(EMPLOYEE_EMAIL).unwrap();
    let tomas = directory.find_by_email("tomas.ried@hrdesk.io").unwrap();
    let ingrid = directory.find_by_email("ingrid.solberg@hrdesk.io").unwrap();

    // Admin holds the unscoped token.
    assert!(can_edit_actor(&catalog, &directory, Some(&admin), &elena).unwrap());
    assert!(can_edit_actor(&catalog, &directory, Some(&admin), &admin).unwrap());

    // HR sees the whole directory but holds no edit token.
    assert!(!can_edit_actor(&catalog, &directory, Some(&hr), &elena).unwrap());
    assert!(!can_edit_actor(&catalog, &directory, Some(&hr), &hr).unwrap());

    // The manager's scoped token covers reports, nothing else.
    assert!(can_edit_actor(&catalog, &directory, Some(&marcus), &elena).unwrap());
    assert!(can_edit_actor(&catalog, &directory, Some(&marcus), &tomas).unwrap());
    assert!(!can_edit_actor(&catalog, &directory, Some(&marcus), &ingrid).unwrap());
    assert!(!can_edit_actor(&catalog, &directory, Some(&marcus), &admin).unwrap());
    assert!(can_edit_actor(&catalog, &directory, Some(&marcus), &marcus).unwrap());

    // Employees edit their own profile and nothing else.
    assert!(can_edit_actor(&catalog, &directory, Some(&elena), &elena).unwrap());
    assert!(!can_edit_actor(&catalog, &directory, Some(&elena), &tomas).unwrap());

    // Nobody signed in, nobody edits.
    assert!(!can_edit_actor(&catalog, &directory, None, &elena).unwrap());
}

#[test]
fn test_role_and_status_changes_are_admin_only() {
    let directory = SeededDirectory::new();
    let catalog = PermissionCatalog::default();

    let admin = directory.find_by_email(ADMIN_EMAIL).unwrap();
    let hr = directory.find_by_email(HR_EMAIL).unwrap();
    let marcus = directory.find_by_email("marcus.vale@hrdesk.io").unwrap();
    let elena = directory.find_by_email(EMPLOYEE_EMAIL).unwrap();

    assert!(can_change_access(&catalog, Some(&admin), &elena).unwrap());
    assert!(!can_change_access(&catalog, Some(&hr), &elena).unwrap());
    assert!(!can_change_access(&catalog, Some(&marcus), &elena).unwrap());
    assert!(!can_change_access(&catalog, Some(&elena), &elena).unwrap());
    assert!(!can_change_access(&catalog, None, &elena).unwrap());
}
