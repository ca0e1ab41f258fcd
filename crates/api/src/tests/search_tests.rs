// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Search and lookup through the API.

use repatria_persistence::{Persistence, RepatriantSummary};

use super::helpers::{
    TestStorage, create_test_admin, create_test_housing, create_test_persistence,
    create_test_registrar, create_test_storage, register_test_repatriant,
};
use crate::{
    AuthenticatedActor, HousingDepartmentRequest, LookupParams, SearchParams, SearchResponse,
    create_housing_department_record, lookup_repatriants, search_repatriants,
};

const CURRENT_YEAR: i32 = 2026;

fn ids(response: &SearchResponse) -> Vec<i64> {
    response.rows.iter().map(|r| r.repatriant_id).collect()
}

#[test]
fn test_empty_search_lists_everything() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    let first: i64 = register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ПЕТРОВ");
    let second: i64 =
        register_test_repatriant(&mut persistence, &storage.storage, &registrar, "СИДОРОВ");

    let response: SearchResponse = search_repatriants(
        &mut persistence,
        &SearchParams::default(),
        &registrar,
        CURRENT_YEAR,
    )
    .unwrap();

    assert_eq!(ids(&response), vec![second, first]);
    assert_eq!(response.total, 2);
    assert_eq!(response.page, 1);
    assert_eq!(response.pages, 1);
    assert!(response.housing_records.is_none());
}

#[test]
fn test_quick_search_matches_lowercase_query() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    let petrov: i64 = register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ПЕТРОВ");
    register_test_repatriant(&mut persistence, &storage.storage, &registrar, "СИДОРОВ");

    let params: SearchParams = SearchParams {
        q: Some(String::from("  петров ")),
        ..SearchParams::default()
    };
    let response: SearchResponse =
        search_repatriants(&mut persistence, &params, &registrar, CURRENT_YEAR).unwrap();

    assert_eq!(ids(&response), vec![petrov]);
}

#[test]
fn test_advanced_criteria_override_quick_query() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ПЕТРОВ");
    let sidorov: i64 =
        register_test_repatriant(&mut persistence, &storage.storage, &registrar, "СИДОРОВ");

    let params: SearchParams = SearchParams {
        q: Some(String::from("ПЕТРОВ")),
        surname: Some(String::from("сидоров")),
        ..SearchParams::default()
    };
    let response: SearchResponse =
        search_repatriants(&mut persistence, &params, &registrar, CURRENT_YEAR).unwrap();

    assert_eq!(ids(&response), vec![sidorov]);
}

#[test]
fn test_housing_criteria_are_ignored_for_registrars() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ПЕТРОВ");

    let params: SearchParams = SearchParams {
        housing_category: Some(String::from("НЕ СУЩЕСТВУЕТ")),
        ..SearchParams::default()
    };
    let response: SearchResponse =
        search_repatriants(&mut persistence, &params, &registrar, CURRENT_YEAR).unwrap();

    assert_eq!(response.total, 1);
}

#[test]
fn test_housing_staff_get_latest_department_records() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let housing: AuthenticatedActor = create_test_housing(&mut persistence);
    let with_record: i64 = register_test_repatriant(&mut persistence, &storage.storage, &admin, "А");
    let without: i64 = register_test_repatriant(&mut persistence, &storage.storage, &admin, "Б");

    create_housing_department_record(
        &mut persistence,
        with_record,
        &HousingDepartmentRequest {
            category: Some(String::from("многодетные")),
            ..HousingDepartmentRequest::default()
        },
        &housing,
    )
    .unwrap();

    let params: SearchParams = SearchParams {
        housing_category: Some(String::from("МНОГОДЕТНЫЕ")),
        ..SearchParams::default()
    };
    let response: SearchResponse =
        search_repatriants(&mut persistence, &params, &housing, CURRENT_YEAR).unwrap();

    assert_eq!(ids(&response), vec![with_record]);
    let records = response.housing_records.unwrap();
    assert_eq!(
        records[&with_record].category.as_deref(),
        Some("МНОГОДЕТНЫЕ")
    );
    assert!(!records.contains_key(&without));
}

#[test]
fn test_page_parameter_below_one_is_clamped() {
    let mut persistence: Persistence = create_test_persistence();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);

    let params: SearchParams = SearchParams {
        page: Some(String::from("-3")),
        ..SearchParams::default()
    };
    let response: SearchResponse =
        search_repatriants(&mut persistence, &params, &registrar, CURRENT_YEAR).unwrap();

    assert_eq!(response.page, 1);
    assert!(response.rows.is_empty());
}

#[test]
fn test_largest_page_parameter_returns_an_empty_page() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ПЕТРОВ");

    let params: SearchParams = SearchParams {
        page: Some(i64::MAX.to_string()),
        ..SearchParams::default()
    };
    let response: SearchResponse =
        search_repatriants(&mut persistence, &params, &registrar, CURRENT_YEAR).unwrap();

    assert_eq!(response.page, i64::MAX);
    assert_eq!(response.total, 1);
    assert!(response.rows.is_empty());
}

#[test]
fn test_lookup_matches_name_phrase() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    let petrov: i64 = register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ПЕТРОВ");
    register_test_repatriant(&mut persistence, &storage.storage, &registrar, "СИДОРОВ");

    let found: Vec<RepatriantSummary> = lookup_repatriants(
        &mut persistence,
        &LookupParams {
            q: Some(String::from("петров иван")),
        },
        &registrar,
    )
    .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].repatriant_id, petrov);
    assert_eq!(found[0].full_name, "ПЕТРОВ ИВАН ПЕТРОВИЧ");
}

#[test]
fn test_blank_lookup_returns_nothing() {
    let mut persistence: Persistence = create_test_persistence();
    let storage: TestStorage = create_test_storage();
    let registrar: AuthenticatedActor = create_test_registrar(&mut persistence);
    register_test_repatriant(&mut persistence, &storage.storage, &registrar, "ПЕТРОВ");

    let found: Vec<RepatriantSummary> =
        lookup_repatriants(&mut persistence, &LookupParams::default(), &registrar).unwrap();

    assert!(found.is_empty());
}
