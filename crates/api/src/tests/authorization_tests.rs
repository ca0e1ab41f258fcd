// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role gates on every protected operation.

use repatria_persistence::Persistence;

use super::helpers::{
    create_test_admin, create_test_housing, create_test_persistence, create_test_registrar,
    create_test_social, create_test_storage, register_test_repatriant, test_now,
};
use crate::{
    AddToQueueRequest, ApiError, AuthenticatedActor, AuthorizationService, ExportFormat,
    ExportKind, HousingDepartmentRequest, LogsParams, OtherRecordRequest,
    RegisterRepatriantRequest, add_to_queue, compute_capabilities, compute_user_capabilities,
    create_housing_department_record, create_other_record, export, housing_view, list_logs,
    list_users, register_repatriant, repatriant_history, social_view, storage_stats,
};

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    assert!(
        matches!(result, Err(ApiError::Unauthorized { .. })),
        "expected Unauthorized, got {result:?}"
    );
}

#[test]
fn test_social_staff_cannot_register_repatriants() {
    let mut persistence: Persistence = create_test_persistence();
    let storage = create_test_storage();
    let social: AuthenticatedActor = create_test_social(&mut persistence);

    let request: RegisterRepatriantRequest = RegisterRepatriantRequest {
        form: super::helpers::create_test_form("ИВАНОВ"),
        ..RegisterRepatriantRequest::default()
    };
    assert_unauthorized(register_repatriant(
        &mut persistence,
        &storage.storage,
        &request,
        &social,
        super::helpers::test_today(),
    ));
    assert_eq!(persistence.count_repatriants().unwrap(), 0);
}

#[test]
fn test_housing_staff_cannot_register_repatriants() {
    let mut persistence: Persistence = create_test_persistence();
    let housing: AuthenticatedActor = create_test_housing(&mut persistence);

    assert!(AuthorizationService::authorize_register_repatriant(&housing).is_err());
}

#[test]
fn test_registrar_cannot_use_social_or_housing_views() {
    let mut persistence: Persistence = create_test_persistence();
    let storage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    let id: i64 = register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ИВАНОВ");

    assert_unauthorized(social_view(&mut persistence, id, &registrar));
    assert_unauthorized(housing_view(&mut persistence, id, &registrar));
}

#[test]
fn test_social_staff_cannot_touch_housing_department() {
    let mut persistence: Persistence = create_test_persistence();
    let storage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let social: AuthenticatedActor = create_test_social(&mut persistence);
    let id: i64 = register_test_repatriant(&mut persistence, &storage.storage, &admin, "ИВАНОВ");

    assert_unauthorized(create_housing_department_record(
        &mut persistence,
        id,
        &HousingDepartmentRequest::default(),
        &social,
    ));
    assert_unauthorized(add_to_queue(
        &mut persistence,
        &AddToQueueRequest {
            repatriant_id: id,
            has_children: false,
            has_work: false,
            has_law_violations: false,
        },
        &social,
        test_now(),
    ));
}

#[test]
fn test_housing_staff_cannot_write_social_case_notes() {
    let mut persistence: Persistence = create_test_persistence();
    let storage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let housing: AuthenticatedActor = create_test_housing(&mut persistence);
    let id: i64 = register_test_repatriant(&mut persistence, &storage.storage, &admin, "ИВАНОВ");

    assert_unauthorized(create_other_record(
        &mut persistence,
        id,
        &OtherRecordRequest {
            title: Some(String::from("Note")),
            record_date: Some(String::from("2026-02-01")),
            category: None,
            content: Some(String::from("Text")),
        },
        &housing,
    ));
}

#[test]
fn test_admin_only_operations_reject_other_roles() {
    let mut persistence: Persistence = create_test_persistence();
    let storage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);

    assert_unauthorized(list_users(&mut persistence, &registrar));
    assert_unauthorized(list_logs(&mut persistence, &LogsParams::default(), &registrar));
    assert_unauthorized(repatriant_history(&mut persistence, 1, &registrar));
    assert_unauthorized(storage_stats(&storage.storage, &registrar));
    assert_unauthorized(export(
        &mut persistence,
        ExportKind::Users,
        ExportFormat::Csv,
        &registrar,
        test_now(),
    ));
}

#[test]
fn test_admin_passes_every_gate() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    assert!(AuthorizationService::authorize_register_repatriant(&admin).is_ok());
    assert!(AuthorizationService::authorize_social(&admin, "test").is_ok());
    assert!(AuthorizationService::authorize_housing(&admin, "test").is_ok());
    assert!(AuthorizationService::authorize_admin(&admin, "test").is_ok());
}

#[test]
fn test_capabilities_follow_role() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let housing: AuthenticatedActor = create_test_housing(&mut persistence);

    let admin_caps = compute_capabilities(&admin);
    assert!(admin_caps.can_manage_users.is_allowed());
    assert!(admin_caps.can_restore_records.is_allowed());

    let housing_caps = compute_capabilities(&housing);
    assert!(housing_caps.can_view_housing.is_allowed());
    assert!(housing_caps.can_manage_housing_queue.is_allowed());
    assert!(!housing_caps.can_view_social.is_allowed());
    assert!(!housing_caps.can_export.is_allowed());
}

#[test]
fn test_admin_cannot_toggle_or_delete_self() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);

    let (toggle_self, delete_self) = compute_user_capabilities(&admin, admin.user_id);
    assert!(!toggle_self.is_allowed());
    assert!(!delete_self.is_allowed());

    let (toggle_other, delete_other) = compute_user_capabilities(&admin, registrar.user_id);
    assert!(toggle_other.is_allowed());
    assert!(delete_other.is_allowed());
}
