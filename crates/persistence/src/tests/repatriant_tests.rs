// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for repatriant registration, editing and deletion.

use super::{
    create_test_dependent, create_test_fields, create_test_persistence, create_test_user,
    register_test_repatriant, test_now,
};
use crate::{NewOtherRecord, PersistenceError, RepatriantChanges};
use repatria_domain::QueueFactors;

#[test]
fn test_register_assigns_sequential_ids() {
    let mut persistence = create_test_persistence();

    let first = register_test_repatriant(&mut persistence, "ПЕТРОВ");
    let second = register_test_repatriant(&mut persistence, "СИДОРОВ");

    assert_eq!(first, 1);
    assert_eq!(second, 2);
}

#[test]
fn test_register_routes_dependents_by_relationship() {
    let mut persistence = create_test_persistence();

    let dependents = vec![
        create_test_dependent("СЫН", "ПЕТРОВ ПЁТР", "2015"),
        create_test_dependent("дочь", "ПЕТРОВА АННА", "2018"),
        create_test_dependent("СУПРУГА", "ПЕТРОВА МАРИЯ", "1990"),
    ];
    let id = persistence
        .register_repatriant(&create_test_fields("ПЕТРОВ", "ИВАН"), &dependents)
        .unwrap();

    let family = persistence.get_family(id).unwrap();
    assert_eq!(family.children.len(), 2);
    assert_eq!(family.family_members.len(), 1);
    assert_eq!(family.family_members[0].birth_year, Some(1990));
    assert_eq!(family.children[0].birth_year.as_deref(), Some("2015"));
}

#[test]
fn test_family_member_with_unparseable_year_stores_null() {
    let mut persistence = create_test_persistence();

    let dependents = vec![create_test_dependent("БРАТ", "ПЕТРОВ ОЛЕГ", "около 1985")];
    let id = persistence
        .register_repatriant(&create_test_fields("ПЕТРОВ", "ИВАН"), &dependents)
        .unwrap();

    let family = persistence.get_family(id).unwrap();
    assert_eq!(family.family_members[0].birth_year, None);
}

#[test]
fn test_update_changes_only_given_fields() {
    let mut persistence = create_test_persistence();
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");

    let changes = RepatriantChanges {
        phone: Some(String::from("+7 700 000 00 00")),
        ..RepatriantChanges::default()
    };
    persistence.update_repatriant(id, &changes, None).unwrap();

    let repatriant = persistence.get_repatriant(id).unwrap().unwrap();
    assert_eq!(repatriant.phone.as_deref(), Some("+7 700 000 00 00"));
    assert_eq!(repatriant.surname.as_deref(), Some("ПЕТРОВ"));
}

#[test]
fn test_update_replaces_the_whole_dependent_set() {
    let mut persistence = create_test_persistence();
    let dependents = vec![
        create_test_dependent("СЫН", "ПЕТРОВ ПЁТР", "2015"),
        create_test_dependent("МАТЬ", "ПЕТРОВА ОЛЬГА", "1960"),
    ];
    let id = persistence
        .register_repatriant(&create_test_fields("ПЕТРОВ", "ИВАН"), &dependents)
        .unwrap();

    let replacement = vec![create_test_dependent("ДОЧЬ", "ПЕТРОВА АННА", "2019")];
    persistence
        .update_repatriant(id, &RepatriantChanges::default(), Some(&replacement))
        .unwrap();

    let family = persistence.get_family(id).unwrap();
    assert_eq!(family.children.len(), 1);
    assert_eq!(family.children[0].full_name.as_deref(), Some("ПЕТРОВА АННА"));
    assert!(family.family_members.is_empty());
}

#[test]
fn test_update_unknown_repatriant_is_not_found() {
    let mut persistence = create_test_persistence();

    let changes = RepatriantChanges {
        phone: Some(String::from("123")),
        ..RepatriantChanges::default()
    };
    let result = persistence.update_repatriant(99, &changes, None);

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_delete_cascades_but_keeps_audit_trail() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let dependents = vec![create_test_dependent("СЫН", "ПЕТРОВ ПЁТР", "2015")];
    let id = persistence
        .register_repatriant(&create_test_fields("ПЕТРОВ", "ИВАН"), &dependents)
        .unwrap();

    let note = NewOtherRecord {
        title: String::from("Звонок"),
        record_date: String::from("2026-02-01"),
        category: None,
        content: String::from("Уточнены документы"),
    };
    persistence.create_other_record(id, &note, user_id).unwrap();
    persistence
        .add_to_queue(id, QueueFactors::new(true, false, false), user_id, test_now())
        .unwrap();

    let entry = repatria_audit::AuditEntry::new(
        repatria_audit::Actor::new(user_id, String::from("admin")),
        repatria_audit::Action::new(
            String::from(repatria_audit::actions::REGISTER_REPATRIANT),
            None,
        ),
        Some(id),
    );
    persistence.log_action(&entry).unwrap();

    persistence.delete_repatriant(id).unwrap();

    assert!(persistence.get_repatriant(id).unwrap().is_none());
    assert!(persistence.get_family(id).unwrap().children.is_empty());
    assert!(persistence.list_other_records(id, true).unwrap().is_empty());
    assert!(persistence.active_queue_entry_for(id).unwrap().is_none());
    assert_eq!(persistence.logs_for_repatriant(id).unwrap().len(), 1);
}

#[test]
fn test_delete_unknown_repatriant_is_not_found() {
    let mut persistence = create_test_persistence();
    assert!(matches!(
        persistence.delete_repatriant(42),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_lookup_matches_name_phrase_case_insensitively() {
    let mut persistence = create_test_persistence();
    persistence
        .register_repatriant(&create_test_fields("ПЕТРОВ", "ИВАН"), &[])
        .unwrap();
    persistence
        .register_repatriant(&create_test_fields("ПЕТРОВ", "ОЛЕГ"), &[])
        .unwrap();

    let both = persistence.lookup_repatriants("петров").unwrap();
    assert_eq!(both.len(), 2);

    let one = persistence.lookup_repatriants("петров олег").unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].full_name, "ПЕТРОВ ОЛЕГ ИВАНОВИЧ");
}

#[test]
fn test_lookup_words_must_be_adjacent_in_the_name() {
    let mut persistence = create_test_persistence();
    let mut fields = create_test_fields("СИДОРОВ", "ИВАН");
    fields.patronymic = Some(String::from("ПЕТРОВИЧ"));
    persistence.register_repatriant(&fields, &[]).unwrap();

    assert!(persistence.lookup_repatriants("петров иван").unwrap().is_empty());
    assert_eq!(persistence.lookup_repatriants("иван петров").unwrap().len(), 1);
}

#[test]
fn test_lookup_matches_file_code() {
    let mut persistence = create_test_persistence();
    let mut fields = create_test_fields("ПЕТРОВ", "ИВАН");
    fields.file_code = Some(String::from("АБ-102"));
    let id = persistence.register_repatriant(&fields, &[]).unwrap();
    register_test_repatriant(&mut persistence, "СИДОРОВ");

    let found = persistence.lookup_repatriants("аб-10").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].repatriant_id, id);
    assert_eq!(found[0].file_code.as_deref(), Some("АБ-102"));
}

#[test]
fn test_lookup_treats_wildcards_literally() {
    let mut persistence = create_test_persistence();
    register_test_repatriant(&mut persistence, "ПЕТРОВ");

    assert!(persistence.lookup_repatriants("%").unwrap().is_empty());
}

#[test]
fn test_count_registered_on_date() {
    let mut persistence = create_test_persistence();
    register_test_repatriant(&mut persistence, "ПЕТРОВ");

    assert_eq!(persistence.count_registered_on("2026-01-15").unwrap(), 1);
    assert_eq!(persistence.count_registered_on("2026-01-16").unwrap(), 0);
}
