// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod initialization_tests;
mod queue_tests;
mod repatriant_tests;
mod user_session_tests;

use repatria_domain::Role;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{DependentInput, Persistence, RepatriantFields};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

/// Creates an active admin and returns its ID.
pub fn create_test_user(persistence: &mut Persistence) -> i64 {
    persistence
        .create_user("admin", "password", "Test Admin", Role::Admin, None)
        .unwrap()
}

pub fn create_test_fields(surname: &str, given_name: &str) -> RepatriantFields {
    RepatriantFields {
        surname: Some(surname.to_string()),
        given_name: Some(given_name.to_string()),
        patronymic: Some(String::from("ИВАНОВИЧ")),
        sex: Some(String::from("М")),
        registered_on: Some(String::from("2026-01-15")),
        ..RepatriantFields::default()
    }
}

pub fn create_test_dependent(relationship: &str, full_name: &str, birth_year: &str) -> DependentInput {
    DependentInput {
        relationship: Some(relationship.to_string()),
        full_name: Some(full_name.to_string()),
        birth_year: Some(birth_year.to_string()),
        ..DependentInput::default()
    }
}

/// Registers a repatriant without dependents and returns its ID.
pub fn register_test_repatriant(persistence: &mut Persistence, surname: &str) -> i64 {
    persistence
        .register_repatriant(&create_test_fields(surname, "ИВАН"), &[])
        .unwrap()
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00:00 UTC)
}
