// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::{QueueCandidate, QueueFactors, QueueStanding, days_in_queue, queue_score, rank_queue};

#[test]
fn test_base_score_sums_flags() {
    assert_eq!(QueueFactors::default().base_score(), 0);
    assert_eq!(QueueFactors::new(true, false, false).base_score(), 10);
    assert_eq!(QueueFactors::new(false, true, false).base_score(), 15);
    assert_eq!(QueueFactors::new(false, false, true).base_score(), -20);
    assert_eq!(QueueFactors::new(true, true, true).base_score(), 5);
}

#[test]
fn test_half_point_per_day_is_truncated() {
    let factors: QueueFactors = QueueFactors::new(true, true, false);
    assert_eq!(queue_score(&factors, 0), 25);
    assert_eq!(queue_score(&factors, 1), 25);
    assert_eq!(queue_score(&factors, 2), 26);
    assert_eq!(queue_score(&factors, 9), 29);
}

#[test]
fn test_negative_scores_truncate_toward_zero() {
    let factors: QueueFactors = QueueFactors::new(false, false, true);
    // -20 + 1.5 = -18.5, truncated to -18
    assert_eq!(queue_score(&factors, 3), -18);
    assert_eq!(queue_score(&factors, 40), 0);
    assert_eq!(queue_score(&factors, 41), 0);
    assert_eq!(queue_score(&factors, 42), 1);
}

#[test]
fn test_score_is_non_decreasing_in_days() {
    for factors in [
        QueueFactors::default(),
        QueueFactors::new(true, false, true),
        QueueFactors::new(false, false, true),
        QueueFactors::new(true, true, false),
    ] {
        let mut previous: i64 = queue_score(&factors, 0);
        for days in 1..400 {
            let current: i64 = queue_score(&factors, days);
            assert!(current >= previous, "score dropped at day {days}");
            previous = current;
        }
    }
}

#[test]
fn test_days_in_queue_counts_whole_days() {
    let added: OffsetDateTime = datetime!(2026-03-01 12:00:00 UTC);
    assert_eq!(days_in_queue(added, datetime!(2026-03-02 11:59:59 UTC)), 0);
    assert_eq!(days_in_queue(added, datetime!(2026-03-02 12:00:00 UTC)), 1);
    assert_eq!(days_in_queue(added, datetime!(2026-03-11 13:00:00 UTC)), 10);
}

#[test]
fn test_days_in_queue_ignores_future_additions() {
    let added: OffsetDateTime = datetime!(2026-03-05 00:00:00 UTC);
    assert_eq!(days_in_queue(added, datetime!(2026-03-01 00:00:00 UTC)), 0);
}

#[test]
fn test_rank_orders_by_score_then_added_at() {
    let now: OffsetDateTime = datetime!(2026-06-01 00:00:00 UTC);
    let candidates: Vec<QueueCandidate> = vec![
        QueueCandidate {
            entry_id: 1,
            factors: QueueFactors::new(true, false, false),
            added_at: now - Duration::days(2),
        },
        QueueCandidate {
            entry_id: 2,
            factors: QueueFactors::new(false, true, false),
            added_at: now - Duration::days(1),
        },
        QueueCandidate {
            entry_id: 3,
            factors: QueueFactors::new(true, false, false),
            added_at: now - Duration::days(3),
        },
        QueueCandidate {
            entry_id: 4,
            factors: QueueFactors::new(false, false, true),
            added_at: now - Duration::days(30),
        },
    ];

    let ranked: Vec<QueueStanding> = rank_queue(&candidates, now);

    // 2: 15, 1: 11, 3: 11 (added earlier), 4: -5
    let order: Vec<(i64, i64, i32)> = ranked
        .iter()
        .map(|s| (s.entry_id, s.score, s.position))
        .collect();
    assert_eq!(order, vec![(2, 15, 1), (3, 11, 2), (1, 11, 3), (4, -5, 4)]);
}

#[test]
fn test_rank_empty_queue() {
    let ranked: Vec<QueueStanding> = rank_queue(&[], datetime!(2026-06-01 00:00:00 UTC));
    assert!(ranked.is_empty());
}
