// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Action, Actor, AuditEntry, actions};

#[test]
fn test_actor_creation_keeps_user_id() {
    let actor: Actor = Actor::new(3, String::from("registrar"));

    assert_eq!(actor.user_id, Some(3));
    assert_eq!(actor.username, "registrar");
}

#[test]
fn test_system_actor_has_no_user() {
    let actor: Actor = Actor::system();

    assert_eq!(actor.user_id, None);
    assert_eq!(actor.username, "SYSTEM");
}

#[test]
fn test_action_text_prefers_details() {
    let entry: AuditEntry = AuditEntry::new(
        Actor::new(1, String::from("admin")),
        Action::new(
            String::from(actions::REGISTER_REPATRIANT),
            Some(String::from("Registered repatriant Иванов Иван")),
        ),
        Some(12),
    );

    assert_eq!(entry.action_text(), "REGISTERED REPATRIANT ИВАНОВ ИВАН");
    assert_eq!(entry.repatriant_id, Some(12));
}

#[test]
fn test_action_text_falls_back_to_name() {
    let entry: AuditEntry = AuditEntry::new(
        Actor::new(1, String::from("admin")),
        Action::new(String::from(actions::LOGIN), None),
        None,
    );

    assert_eq!(entry.action_text(), "LOGIN");
}

#[test]
fn test_describe_keeps_username_case() {
    let entry: AuditEntry = AuditEntry::new(
        Actor::new(5, String::from("petrova")),
        Action::new(String::from(actions::LOGOUT), Some(String::from("logout"))),
        None,
    );

    assert_eq!(entry.describe(), "petrova: LOGOUT");
}
