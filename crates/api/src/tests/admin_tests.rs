// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User administration, the log viewer, and reports.

use repatria_domain::Role;
use repatria_persistence::{LOG_PAGE_SIZE, Persistence};

use super::helpers::{
    TEST_PASSWORD, TestStorage, create_test_admin, create_test_dependent, create_test_form,
    create_test_persistence, create_test_registrar, create_test_social, create_test_storage,
    register_test_repatriant, test_now, test_today,
};
use crate::{
    ApiError, AuthenticatedActor, Capability, CreateUserRequest, CreateUserResponse, FamilyReport,
    LoginRequest, LogsParams, LogsResponse, RegisterRepatriantRequest, RepatriantsReport,
    SummaryReport, ToggleUserResponse, UserActivityReport, UserInfo, create_user, delete_user,
    list_logs, list_users, login, register_repatriant, report_family, report_repatriants,
    report_summary, report_user_activity, toggle_user,
};

fn user_request(username: &str, role: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        password: String::from(TEST_PASSWORD),
        full_name: String::from("мария иванова"),
        role: role.to_string(),
    }
}

#[test]
fn test_create_user_uppercases_full_name_only() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let response: CreateUserResponse = create_user(
        &mut persistence,
        &user_request("Maria", "SOCIAL_ADAPTATION"),
        &admin,
    )
    .unwrap();

    assert_eq!(response.username, "Maria");
    assert_eq!(response.full_name, "МАРИЯ ИВАНОВА");
    assert_eq!(response.role, Role::SocialAdaptation);

    let (logs, _) = persistence.list_logs(1).unwrap();
    assert_eq!(logs[0].action_name, "CREATE_USER");
}

#[test]
fn test_create_user_rejects_unknown_role() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let result: Result<CreateUserResponse, ApiError> =
        create_user(&mut persistence, &user_request("maria", "SUPERUSER"), &admin);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "role"
    ));
}

#[test]
fn test_create_user_rejects_duplicate_username() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let result: Result<CreateUserResponse, ApiError> =
        create_user(&mut persistence, &user_request("admin", "USER"), &admin);

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "unique_username"
    ));
}

#[test]
fn test_create_user_requires_fields() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let result: Result<CreateUserResponse, ApiError> =
        create_user(&mut persistence, &user_request("   ", "USER"), &admin);
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "username"
    ));

    let mut request: CreateUserRequest = user_request("maria", "USER");
    request.password = String::new();
    let result: Result<CreateUserResponse, ApiError> =
        create_user(&mut persistence, &request, &admin);
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "password"
    ));
}

#[test]
fn test_user_management_is_admin_only() {
    let mut persistence: Persistence = create_test_persistence();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);

    let result: Result<CreateUserResponse, ApiError> =
        create_user(&mut persistence, &user_request("maria", "USER"), &registrar);

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_admin_cannot_toggle_or_delete_itself() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let toggled: Result<ToggleUserResponse, ApiError> =
        toggle_user(&mut persistence, admin.user_id, &admin);
    assert!(matches!(
        toggled,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "no_self_modification"
    ));

    let deleted = delete_user(&mut persistence, admin.user_id, &admin);
    assert!(matches!(
        deleted,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "no_self_modification"
    ));
}

#[test]
fn test_deactivation_ends_sessions_and_toggle_reactivates() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    let session: String = login(
        &mut persistence,
        &LoginRequest {
            username: String::from("registrar"),
            password: String::from(TEST_PASSWORD),
        },
        test_now(),
    )
    .unwrap()
    .session_token;

    let response: ToggleUserResponse =
        toggle_user(&mut persistence, registrar.user_id, &admin).unwrap();
    assert!(!response.is_active);
    assert!(persistence.get_session_by_token(&session).unwrap().is_none());

    let response: ToggleUserResponse =
        toggle_user(&mut persistence, registrar.user_id, &admin).unwrap();
    assert!(response.is_active);
    assert_eq!(response.message, "Activated user registrar");
}

#[test]
fn test_delete_unknown_user_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let result = delete_user(&mut persistence, 999, &admin);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_list_users_marks_own_account_as_locked() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let social: AuthenticatedActor = create_test_social(&mut persistence);

    let users: Vec<UserInfo> = list_users(&mut persistence, &admin).unwrap();

    assert_eq!(users.len(), 2);
    let own: &UserInfo = users
        .iter()
        .find(|u| u.user.user_id == admin.user_id)
        .unwrap();
    assert_eq!(own.can_toggle, Capability::Denied);
    assert_eq!(own.can_delete, Capability::Denied);
    let other: &UserInfo = users
        .iter()
        .find(|u| u.user.user_id == social.user_id)
        .unwrap();
    assert_eq!(other.can_toggle, Capability::Allowed);
}

#[test]
fn test_log_pages() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    for i in 0..=LOG_PAGE_SIZE {
        create_user(
            &mut persistence,
            &user_request(&format!("user{i}"), "USER"),
            &admin,
        )
        .unwrap();
    }

    let first: LogsResponse = list_logs(&mut persistence, &LogsParams::default(), &admin).unwrap();
    assert_eq!(first.page, 1);
    assert_eq!(first.total, LOG_PAGE_SIZE + 1);
    assert_eq!(first.pages, 2);
    assert_eq!(first.logs.len(), usize::try_from(LOG_PAGE_SIZE).unwrap());

    let second: LogsResponse = list_logs(
        &mut persistence,
        &LogsParams {
            page: Some(String::from("2")),
        },
        &admin,
    )
    .unwrap();
    assert_eq!(second.logs.len(), 1);
    assert_eq!(second.logs[0].action_text, "CREATED USER USER0 WITH ROLE USER");
}

#[test]
fn test_summary_report_counts() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    create_test_social(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &admin, "ИВАНОВ");

    let report: SummaryReport = report_summary(&mut persistence, &admin, test_today()).unwrap();

    assert_eq!(report.total_repatriants, 1);
    assert_eq!(report.registered_today, 1);
    assert_eq!(report.total_users, 2);
    assert_eq!(report.active_users, 2);
    assert_eq!(report.active_queue_entries, 0);
    assert_eq!(report.case_notes.social_help_records, 0);
}

#[test]
fn test_repatriant_report_groups_by_sex_and_origin() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &admin, "ИВАНОВ");
    register_test_repatriant(&mut persistence, &storage.storage, &admin, "ПЕТРОВ");

    let report: RepatriantsReport = report_repatriants(&mut persistence, &admin).unwrap();

    assert_eq!(report.by_sex.len(), 1);
    assert_eq!(report.by_sex[0].value, "М");
    assert_eq!(report.by_sex[0].count, 2);
    assert_eq!(report.top_origins[0].value, "КАЗАХСТАН");
}

#[test]
fn test_family_report_finds_large_families_and_singles() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let single: i64 = register_test_repatriant(&mut persistence, &storage.storage, &admin, "ПЕТРОВ");
    let request: RegisterRepatriantRequest = RegisterRepatriantRequest {
        form: create_test_form("ИВАНОВ"),
        children: vec![
            create_test_dependent("сын", "петр", "2010"),
            create_test_dependent("дочь", "анна", "2012"),
            create_test_dependent("сын", "олег", "2015"),
        ],
        family_members: Vec::new(),
    };
    let large: i64 = register_repatriant(
        &mut persistence,
        &storage.storage,
        &request,
        &admin,
        test_today(),
    )
    .unwrap()
    .repatriant_id;

    let report: FamilyReport = report_family(&mut persistence, &admin).unwrap();

    assert_eq!(report.large_families.len(), 1);
    assert_eq!(report.large_families[0].repatriant.repatriant_id, large);
    assert_eq!(report.large_families[0].children, 3);
    assert_eq!(report.without_dependents.len(), 1);
    assert_eq!(report.without_dependents[0].repatriant_id, single);
}

#[test]
fn test_user_activity_report_counts_actions() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &admin, "ИВАНОВ");
    register_test_repatriant(&mut persistence, &storage.storage, &admin, "ПЕТРОВ");

    let report: UserActivityReport = report_user_activity(&mut persistence, &admin).unwrap();

    assert_eq!(report.activity.len(), 1);
    assert_eq!(report.activity[0].username, "admin");
    assert_eq!(report.activity[0].actions, 2);
}
