// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Social adaptation case notes: create, update, soft delete, restore.

use repatria_persistence::{
    EventRecordData, HousingRecordData, OtherRecordData, Persistence, SocialHelpRecordData,
};

use super::helpers::{
    TestStorage, create_test_admin, create_test_persistence, create_test_social,
    create_test_storage, register_test_repatriant,
};
use crate::{
    ApiError, AuthenticatedActor, CaseNoteKind, EventRequest, HousingRecordRequest,
    OtherRecordRequest, RecordResponse, SocialHelpRequest, SocialViewResponse,
    create_event_record, create_housing_record, create_other_record, create_social_help_record,
    delete_case_note, list_event_records, list_housing_records, list_other_records,
    list_social_help_records, restore_case_note, social_view, update_housing_record,
    update_social_help_record,
};

struct Fixture {
    persistence: Persistence,
    _storage: TestStorage,
    admin: AuthenticatedActor,
    social: AuthenticatedActor,
    repatriant_id: i64,
}

fn fixture() -> Fixture {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let social: AuthenticatedActor = create_test_social(&mut persistence);
    let repatriant_id: i64 =
        register_test_repatriant(&mut persistence, &storage.storage, &admin, "ИВАНОВ");
    Fixture {
        persistence,
        _storage: storage,
        admin,
        social,
        repatriant_id,
    }
}

fn housing_request() -> HousingRecordRequest {
    HousingRecordRequest {
        contract_number: Some(String::from("дн-12")),
        address: Some(String::from("сухум, мира, 5, 12")),
        start_date: Some(String::from("2026-01-10")),
        cost: Some(String::from("15000.50")),
        documents: Some(vec![String::from("contracts/c_1.pdf"), String::from("  ")]),
        ..HousingRecordRequest::default()
    }
}

fn help_request(help_type: &str, custom: Option<&str>) -> SocialHelpRequest {
    SocialHelpRequest {
        help_type: Some(help_type.to_string()),
        custom_help_type: custom.map(str::to_string),
        help_date: Some(String::from("2026-02-01")),
        ..SocialHelpRequest::default()
    }
}

#[test]
fn test_create_housing_record_normalizes_input() {
    let mut f: Fixture = fixture();

    let response: RecordResponse =
        create_housing_record(&mut f.persistence, f.repatriant_id, &housing_request(), &f.social)
            .unwrap();

    let records: Vec<HousingRecordData> =
        list_housing_records(&mut f.persistence, f.repatriant_id, &f.social).unwrap();
    assert_eq!(records.len(), 1);
    let record: &HousingRecordData = &records[0];
    assert_eq!(record.record_id, response.record_id);
    assert_eq!(record.contract_number.as_deref(), Some("ДН-12"));
    assert_eq!(record.address, "СУХУМ, МИРА, 5, 12");
    assert!(record.cost.is_some_and(|c| (c - 15000.5).abs() < f64::EPSILON));
    assert_eq!(record.documents, vec![String::from("contracts/c_1.pdf")]);
    assert_eq!(record.meta.created_by, Some(f.social.user_id));
}

#[test]
fn test_create_housing_record_requires_start_date() {
    let mut f: Fixture = fixture();
    let request: HousingRecordRequest = HousingRecordRequest {
        start_date: Some(String::from("not a date")),
        ..housing_request()
    };

    let result: Result<RecordResponse, ApiError> =
        create_housing_record(&mut f.persistence, f.repatriant_id, &request, &f.social);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "start_date"
    ));
}

#[test]
fn test_case_note_for_unknown_repatriant_is_not_found() {
    let mut f: Fixture = fixture();

    let result: Result<RecordResponse, ApiError> =
        create_housing_record(&mut f.persistence, 999, &housing_request(), &f.social);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_update_housing_record_changes_only_given_fields() {
    let mut f: Fixture = fixture();
    let created: RecordResponse =
        create_housing_record(&mut f.persistence, f.repatriant_id, &housing_request(), &f.social)
            .unwrap();

    update_housing_record(
        &mut f.persistence,
        created.record_id,
        &HousingRecordRequest {
            end_date: Some(String::from("2026-12-31")),
            ..HousingRecordRequest::default()
        },
        &f.social,
    )
    .unwrap();

    let records: Vec<HousingRecordData> =
        list_housing_records(&mut f.persistence, f.repatriant_id, &f.social).unwrap();
    assert_eq!(records[0].end_date.as_deref(), Some("2026-12-31"));
    assert_eq!(records[0].start_date, "2026-01-10");
    assert_eq!(records[0].documents.len(), 1);
}

#[test]
fn test_custom_help_type_kept_only_for_other() {
    let mut f: Fixture = fixture();

    create_social_help_record(
        &mut f.persistence,
        f.repatriant_id,
        &help_request("Другое", Some("ремонт")),
        &f.social,
    )
    .unwrap();
    create_social_help_record(
        &mut f.persistence,
        f.repatriant_id,
        &help_request("материальная", Some("ремонт")),
        &f.social,
    )
    .unwrap();

    let records: Vec<SocialHelpRecordData> =
        list_social_help_records(&mut f.persistence, f.repatriant_id, &f.social).unwrap();
    let custom: Vec<Option<&str>> = records
        .iter()
        .map(|r| r.custom_help_type.as_deref())
        .collect();
    assert!(custom.contains(&Some("РЕМОНТ")));
    assert!(custom.contains(&None));
}

#[test]
fn test_changing_help_type_clears_custom_type() {
    let mut f: Fixture = fixture();
    let created: RecordResponse = create_social_help_record(
        &mut f.persistence,
        f.repatriant_id,
        &help_request("другое", Some("ремонт")),
        &f.social,
    )
    .unwrap();

    update_social_help_record(
        &mut f.persistence,
        created.record_id,
        &SocialHelpRequest {
            help_type: Some(String::from("материальная")),
            ..SocialHelpRequest::default()
        },
        &f.social,
    )
    .unwrap();

    let record = f
        .persistence
        .get_social_help_record(created.record_id, false)
        .unwrap()
        .unwrap();
    assert_eq!(record.help_type, "МАТЕРИАЛЬНАЯ");
    assert!(
        record
            .custom_help_type
            .as_deref()
            .is_none_or(str::is_empty)
    );
}

#[test]
fn test_event_and_other_records_round_out_social_view() {
    let mut f: Fixture = fixture();
    create_event_record(
        &mut f.persistence,
        f.repatriant_id,
        &EventRequest {
            event_name: Some(String::from("концерт")),
            event_start_date: Some(String::from("2026-02-10")),
            event_amount: Some(String::from("300")),
            ..EventRequest::default()
        },
        &f.social,
    )
    .unwrap();
    create_other_record(
        &mut f.persistence,
        f.repatriant_id,
        &OtherRecordRequest {
            title: Some(String::from("звонок")),
            record_date: Some(String::from("2026-02-11")),
            category: None,
            content: Some(String::from("обсудили работу")),
        },
        &f.social,
    )
    .unwrap();

    let events: Vec<EventRecordData> =
        list_event_records(&mut f.persistence, f.repatriant_id, &f.social).unwrap();
    assert_eq!(events[0].event_name, "КОНЦЕРТ");
    assert!(events[0].event_amount.is_some_and(|a| (a - 300.0).abs() < f64::EPSILON));

    let others: Vec<OtherRecordData> =
        list_other_records(&mut f.persistence, f.repatriant_id, &f.social).unwrap();
    assert_eq!(others[0].content, "ОБСУДИЛИ РАБОТУ");

    let view: SocialViewResponse =
        social_view(&mut f.persistence, f.repatriant_id, &f.social).unwrap();
    assert_eq!(view.full_name, "ИВАНОВ ИВАН ПЕТРОВИЧ");
    assert_eq!(view.event_records.len(), 1);
    assert_eq!(view.other_records.len(), 1);
    assert!(view.housing_records.is_empty());
}

#[test]
fn test_other_record_requires_content() {
    let mut f: Fixture = fixture();

    let result: Result<RecordResponse, ApiError> = create_other_record(
        &mut f.persistence,
        f.repatriant_id,
        &OtherRecordRequest {
            title: Some(String::from("звонок")),
            record_date: Some(String::from("2026-02-11")),
            ..OtherRecordRequest::default()
        },
        &f.social,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "content"
    ));
}

#[test]
fn test_soft_deleted_notes_are_hidden_from_staff_but_shown_to_admins() {
    let mut f: Fixture = fixture();
    let created: RecordResponse =
        create_housing_record(&mut f.persistence, f.repatriant_id, &housing_request(), &f.social)
            .unwrap();

    delete_case_note(
        &mut f.persistence,
        CaseNoteKind::HousingRecord,
        created.record_id,
        &f.social,
    )
    .unwrap();

    assert!(
        list_housing_records(&mut f.persistence, f.repatriant_id, &f.social)
            .unwrap()
            .is_empty()
    );
    let admin_view: Vec<HousingRecordData> =
        list_housing_records(&mut f.persistence, f.repatriant_id, &f.admin).unwrap();
    assert_eq!(admin_view.len(), 1);
    assert!(admin_view[0].meta.is_deleted);
    assert_eq!(admin_view[0].meta.deleted_by, Some(f.social.user_id));
}

#[test]
fn test_deleted_note_cannot_be_updated_or_deleted_again() {
    let mut f: Fixture = fixture();
    let created: RecordResponse =
        create_housing_record(&mut f.persistence, f.repatriant_id, &housing_request(), &f.social)
            .unwrap();
    delete_case_note(
        &mut f.persistence,
        CaseNoteKind::HousingRecord,
        created.record_id,
        &f.social,
    )
    .unwrap();

    assert!(matches!(
        update_housing_record(
            &mut f.persistence,
            created.record_id,
            &housing_request(),
            &f.social
        ),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert!(matches!(
        delete_case_note(
            &mut f.persistence,
            CaseNoteKind::HousingRecord,
            created.record_id,
            &f.social
        ),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_restore_is_admin_only() {
    let mut f: Fixture = fixture();
    let created: RecordResponse =
        create_housing_record(&mut f.persistence, f.repatriant_id, &housing_request(), &f.social)
            .unwrap();
    delete_case_note(
        &mut f.persistence,
        CaseNoteKind::HousingRecord,
        created.record_id,
        &f.social,
    )
    .unwrap();

    assert!(matches!(
        restore_case_note(
            &mut f.persistence,
            CaseNoteKind::HousingRecord,
            created.record_id,
            &f.social
        ),
        Err(ApiError::Unauthorized { .. })
    ));

    restore_case_note(
        &mut f.persistence,
        CaseNoteKind::HousingRecord,
        created.record_id,
        &f.admin,
    )
    .unwrap();
    assert_eq!(
        list_housing_records(&mut f.persistence, f.repatriant_id, &f.social)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_case_note_writes_are_audited_against_repatriant() {
    let mut f: Fixture = fixture();
    let created: RecordResponse =
        create_housing_record(&mut f.persistence, f.repatriant_id, &housing_request(), &f.social)
            .unwrap();
    delete_case_note(
        &mut f.persistence,
        CaseNoteKind::HousingRecord,
        created.record_id,
        &f.social,
    )
    .unwrap();

    let actions: Vec<String> = f
        .persistence
        .logs_for_repatriant(f.repatriant_id)
        .unwrap()
        .into_iter()
        .map(|log| log.action_name)
        .collect();
    assert_eq!(
        actions,
        vec![
            String::from("DELETE_CASE_NOTE"),
            String::from("CREATE_CASE_NOTE"),
            String::from("REGISTER_REPATRIANT"),
        ]
    );
}
