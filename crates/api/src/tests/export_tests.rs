// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV and JSON exports.

use std::str::FromStr;

use repatria_persistence::Persistence;

use super::helpers::{
    TestStorage, create_test_admin, create_test_dependent, create_test_form,
    create_test_persistence, create_test_storage, register_test_repatriant, test_now, test_today,
};
use crate::{
    ApiError, AuthenticatedActor, ExportFormat, ExportKind, FileDownload,
    RegisterRepatriantRequest, export, register_repatriant,
};

fn body_text(file: &FileDownload) -> String {
    String::from_utf8(file.body.clone()).unwrap()
}

#[test]
fn test_export_kind_and_format_parse() {
    assert_eq!(ExportKind::from_str("families").unwrap(), ExportKind::Families);
    assert!(matches!(
        ExportKind::from_str("passwords"),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert_eq!(ExportFormat::from_str("JSON").unwrap(), ExportFormat::Json);
    assert!(matches!(
        ExportFormat::from_str("xml"),
        Err(ApiError::InvalidInput { .. })
    ));
}

#[test]
fn test_repatriant_csv_uses_legacy_header_in_id_order() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &admin, "ПЕТРОВ");
    register_test_repatriant(&mut persistence, &storage.storage, &admin, "СИДОРОВ");

    let file: FileDownload = export(
        &mut persistence,
        ExportKind::Repatriants,
        ExportFormat::Csv,
        &admin,
        test_now(),
    )
    .unwrap();

    assert_eq!(file.file_name, "repatriants_20260301_120000.csv");
    assert!(file.content_type.starts_with("text/csv"));
    let text: String = body_text(&file);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "ID,F,I,O,SEX,DATE_R,FROM_LOC,SEM_POLOJ,REZERV");
    assert!(lines[1].starts_with("1,ПЕТРОВ,ИВАН,ПЕТРОВИЧ,М,1980-05-17,КАЗАХСТАН"));
    assert!(lines[2].starts_with("2,СИДОРОВ"));
}

#[test]
fn test_user_json_never_contains_password_hash() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    let file: FileDownload = export(
        &mut persistence,
        ExportKind::Users,
        ExportFormat::Json,
        &admin,
        test_now(),
    )
    .unwrap();

    let text: String = body_text(&file);
    assert!(text.contains("\"username\": \"admin\""));
    assert!(!text.contains("password"));
    assert_eq!(file.file_name, "users_20260301_120000.json");
}

#[test]
fn test_family_export_tags_children_and_adults() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let request: RegisterRepatriantRequest = RegisterRepatriantRequest {
        form: create_test_form("ИВАНОВ"),
        children: vec![create_test_dependent("сын", "петр", "2015")],
        family_members: vec![create_test_dependent("жена", "анна", "1982")],
    };
    register_repatriant(
        &mut persistence,
        &storage.storage,
        &request,
        &admin,
        test_today(),
    )
    .unwrap();

    let file: FileDownload = export(
        &mut persistence,
        ExportKind::Families,
        ExportFormat::Csv,
        &admin,
        test_now(),
    )
    .unwrap();

    let text: String = body_text(&file);
    assert!(text.contains("1,CHILD,СЫН,ПЕТР,2015"));
    assert!(text.contains("1,ADULT,ЖЕНА,АННА,1982"));
}

#[test]
fn test_export_is_audited() {
    let mut persistence: Persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);

    export(
        &mut persistence,
        ExportKind::Logs,
        ExportFormat::Csv,
        &admin,
        test_now(),
    )
    .unwrap();

    let (logs, _) = persistence.list_logs(1).unwrap();
    assert_eq!(logs[0].action_name, "EXPORT");
    assert_eq!(logs[0].action_text, "EXPORTED LOGS AS CSV");
}
