// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for operator accounts and sessions.

use repatria_domain::{DomainError, Role};

use super::{create_test_persistence, create_test_user};
use crate::PersistenceError;

#[test]
fn test_create_user_hashes_password() {
    let mut persistence = create_test_persistence();

    let user_id = persistence
        .create_user("registrar", "secret", "Регистратор", Role::Registrar, None)
        .unwrap();

    let user = persistence.get_user_by_id(user_id).unwrap().unwrap();
    assert_eq!(user.role, Role::Registrar);
    assert!(user.is_active);
    assert_ne!(user.password_hash, "secret");
    assert!(bcrypt::verify("secret", &user.password_hash).unwrap());
}

#[test]
fn test_duplicate_username_is_rejected() {
    let mut persistence = create_test_persistence();
    create_test_user(&mut persistence);

    let result = persistence.create_user("admin", "other", "Другой", Role::Registrar, None);

    assert!(matches!(
        result,
        Err(PersistenceError::Domain(DomainError::DuplicateUsername(_)))
    ));
}

#[test]
fn test_deactivate_and_delete_user() {
    let mut persistence = create_test_persistence();
    let admin_id = create_test_user(&mut persistence);
    let user_id = persistence
        .create_user("housing", "pw", "Жилотдел", Role::HousingDepartment, Some(admin_id))
        .unwrap();

    persistence.set_user_active(user_id, false).unwrap();
    assert_eq!(persistence.count_active_users().unwrap(), 1);
    assert_eq!(persistence.count_users().unwrap(), 2);

    persistence.delete_user(user_id).unwrap();
    assert!(persistence.get_user_by_username("housing").unwrap().is_none());
    assert!(matches!(
        persistence.delete_user(user_id),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_session_lifecycle() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);

    let session_id = persistence
        .create_session("token-1", user_id, "2026-03-01 10:00:00", "2026-03-02 10:00:00")
        .unwrap();
    persistence
        .touch_session(session_id, "2026-03-01 11:00:00", "2026-03-02 11:00:00")
        .unwrap();

    let session = persistence.get_session_by_token("token-1").unwrap().unwrap();
    assert_eq!(session.user_id, user_id);
    assert_eq!(session.last_activity_at, "2026-03-01 11:00:00");
    assert_eq!(session.expires_at, "2026-03-02 11:00:00");

    persistence.delete_session("token-1").unwrap();
    assert!(persistence.get_session_by_token("token-1").unwrap().is_none());
}

#[test]
fn test_expired_sessions_are_purged() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);

    persistence
        .create_session("old", user_id, "2026-03-01 10:00:00", "2026-03-02 10:00:00")
        .unwrap();
    persistence
        .create_session("fresh", user_id, "2026-03-03 09:00:00", "2026-03-04 09:00:00")
        .unwrap();

    let purged = persistence
        .delete_expired_sessions("2026-03-03 10:00:00")
        .unwrap();

    assert_eq!(purged, 1);
    assert!(persistence.get_session_by_token("old").unwrap().is_none());
    assert!(persistence.get_session_by_token("fresh").unwrap().is_some());
}

#[test]
fn test_deleting_user_drops_sessions() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    persistence
        .create_session("token-1", user_id, "2026-03-01 10:00:00", "2026-03-02 10:00:00")
        .unwrap();

    persistence.delete_user(user_id).unwrap();

    assert!(persistence.get_session_by_token("token-1").unwrap().is_none());
}

#[test]
fn test_recent_logins_are_newest_first() {
    let mut persistence = create_test_persistence();
    let admin_id = create_test_user(&mut persistence);
    let other_id = persistence
        .create_user("social", "pw", "Соцадаптация", Role::SocialAdaptation, None)
        .unwrap();
    persistence.create_user("idle", "pw", "Без входа", Role::Registrar, None).unwrap();

    persistence.update_last_login(admin_id, "2026-03-01 09:00:00").unwrap();
    persistence.update_last_login(other_id, "2026-03-01 10:00:00").unwrap();

    let names: Vec<String> = persistence
        .recent_logins(5)
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec![String::from("social"), String::from("admin")]);
}
