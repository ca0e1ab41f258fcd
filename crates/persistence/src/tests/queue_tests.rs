// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the housing waitlist.

use repatria_domain::{DomainError, QueueFactors};
use time::Duration;

use super::{create_test_persistence, create_test_user, register_test_repatriant, test_now};
use crate::PersistenceError;

#[test]
fn test_add_stores_initial_score() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");

    let entry_id = persistence
        .add_to_queue(id, QueueFactors::new(true, true, false), user_id, test_now())
        .unwrap();

    let entry = persistence.get_queue_entry(entry_id).unwrap().unwrap();
    assert_eq!(entry.total_score, 25);
    assert!(entry.is_active);
    assert_eq!(entry.added_at, "2026-03-01 12:00:00");
}

#[test]
fn test_second_active_entry_is_rejected() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");

    persistence
        .add_to_queue(id, QueueFactors::default(), user_id, test_now())
        .unwrap();
    let result = persistence.add_to_queue(id, QueueFactors::default(), user_id, test_now());

    assert!(matches!(
        result,
        Err(PersistenceError::Domain(DomainError::AlreadyQueued { repatriant_id })) if repatriant_id == id
    ));
}

#[test]
fn test_requeue_after_removal_is_allowed() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");

    let first = persistence
        .add_to_queue(id, QueueFactors::default(), user_id, test_now())
        .unwrap();
    persistence.remove_from_queue(first, user_id, test_now()).unwrap();

    let removed = persistence.get_queue_entry(first).unwrap().unwrap();
    assert!(!removed.is_active);
    assert_eq!(removed.removed_by, Some(user_id));
    assert!(removed.queue_position.is_none());

    let second = persistence
        .add_to_queue(id, QueueFactors::default(), user_id, test_now())
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(persistence.active_queue_entry_for(id).unwrap().map(|e| e.entry_id), Some(second));
}

#[test]
fn test_add_for_unknown_repatriant_is_not_found() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);

    assert!(matches!(
        persistence.add_to_queue(12, QueueFactors::default(), user_id, test_now()),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_rank_orders_by_score_then_added_at() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let early = register_test_repatriant(&mut persistence, "ПЕТРОВ");
    let late = register_test_repatriant(&mut persistence, "СИДОРОВ");
    let violator = register_test_repatriant(&mut persistence, "КУЗНЕЦОВ");

    let start = test_now();
    persistence
        .add_to_queue(early, QueueFactors::new(true, false, false), user_id, start)
        .unwrap();
    persistence
        .add_to_queue(late, QueueFactors::new(true, false, false), user_id, start + Duration::hours(1))
        .unwrap();
    persistence
        .add_to_queue(violator, QueueFactors::new(true, true, true), user_id, start)
        .unwrap();

    let ranked = persistence
        .rank_active_queue(start + Duration::days(10))
        .unwrap();

    let order: Vec<i64> = ranked.iter().map(|r| r.entry.repatriant_id).collect();
    assert_eq!(order, vec![early, late, violator]);
    assert_eq!(ranked[0].entry.total_score, 15);
    assert_eq!(ranked[2].entry.total_score, 10);
    assert_eq!(ranked[0].full_name, "ПЕТРОВ ИВАН ИВАНОВИЧ");

    let positions: Vec<Option<i32>> = ranked.iter().map(|r| r.entry.queue_position).collect();
    assert_eq!(positions, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn test_rank_persists_scores_and_positions() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");
    let entry_id = persistence
        .add_to_queue(id, QueueFactors::new(false, true, false), user_id, test_now())
        .unwrap();

    persistence
        .rank_active_queue(test_now() + Duration::days(4))
        .unwrap();

    let entry = persistence.get_queue_entry(entry_id).unwrap().unwrap();
    assert_eq!(entry.total_score, 17);
    assert_eq!(entry.queue_position, Some(1));
}

#[test]
fn test_update_rescores_with_waiting_days() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");
    let entry_id = persistence
        .add_to_queue(id, QueueFactors::default(), user_id, test_now())
        .unwrap();

    let updated = persistence
        .update_queue_entry(
            entry_id,
            QueueFactors::new(false, false, true),
            test_now() + Duration::days(6),
        )
        .unwrap();

    assert!(updated.has_law_violations);
    assert_eq!(updated.total_score, -17);
}

#[test]
fn test_update_of_removed_entry_is_not_found() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");
    let entry_id = persistence
        .add_to_queue(id, QueueFactors::default(), user_id, test_now())
        .unwrap();
    persistence.remove_from_queue(entry_id, user_id, test_now()).unwrap();

    assert!(matches!(
        persistence.update_queue_entry(entry_id, QueueFactors::new(true, true, false), test_now()),
        Err(PersistenceError::NotFound(_))
    ));

    let stored = persistence.get_queue_entry(entry_id).unwrap().unwrap();
    assert!(!stored.is_active);
    assert!(!stored.has_children);
    assert_eq!(stored.total_score, 0);
}

#[test]
fn test_remove_returns_the_removed_row() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_user(&mut persistence);
    let id = register_test_repatriant(&mut persistence, "ПЕТРОВ");
    let entry_id = persistence
        .add_to_queue(id, QueueFactors::new(true, false, false), user_id, test_now())
        .unwrap();

    let removed = persistence
        .remove_from_queue(entry_id, user_id, test_now())
        .unwrap();

    assert_eq!(removed.entry_id, entry_id);
    assert!(!removed.is_active);
    assert_eq!(removed.removed_by, Some(user_id));
    assert_eq!(removed.removed_at.as_deref(), Some("2026-03-01 12:00:00"));
    assert!(removed.queue_position.is_none());
}
