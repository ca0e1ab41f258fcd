// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Housing waitlist scoring and ranking.
//!
//! Scores are never cached: every read of the active queue recomputes them
//! against the current time and reassigns positions.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Points for a repatriant with children.
pub const CHILDREN_BONUS: i64 = 10;
/// Points for a repatriant with work.
pub const WORK_BONUS: i64 = 15;
/// Points removed for recorded law violations.
pub const LAW_VIOLATION_PENALTY: i64 = 20;

/// The three boolean scoring inputs of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueFactors {
    pub has_children: bool,
    pub has_work: bool,
    pub has_law_violations: bool,
}

impl QueueFactors {
    #[must_use]
    pub const fn new(has_children: bool, has_work: bool, has_law_violations: bool) -> Self {
        Self {
            has_children,
            has_work,
            has_law_violations,
        }
    }

    /// Score contribution of the flags alone.
    #[must_use]
    pub const fn base_score(&self) -> i64 {
        let mut score: i64 = 0;
        if self.has_children {
            score += CHILDREN_BONUS;
        }
        if self.has_work {
            score += WORK_BONUS;
        }
        if self.has_law_violations {
            score -= LAW_VIOLATION_PENALTY;
        }
        score
    }
}

/// Whole days an entry has waited. Entries added "in the future" count zero.
#[must_use]
pub fn days_in_queue(added_at: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (now - added_at).whole_days().max(0)
}

/// Computes the queue score: flags plus half a point per day, truncated
/// toward zero.
#[must_use]
pub const fn queue_score(factors: &QueueFactors, days_in_queue: i64) -> i64 {
    (2 * factors.base_score() + days_in_queue) / 2
}

/// An active entry to be ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueCandidate {
    pub entry_id: i64,
    pub factors: QueueFactors,
    pub added_at: OffsetDateTime,
}

/// An entry with its recomputed score and 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStanding {
    pub entry_id: i64,
    pub score: i64,
    pub position: i32,
}

/// Scores and orders the active queue.
///
/// Order is score descending, then earliest `added_at`, then entry id.
/// Positions run 1..N in that order.
#[must_use]
pub fn rank_queue(candidates: &[QueueCandidate], now: OffsetDateTime) -> Vec<QueueStanding> {
    let mut scored: Vec<(i64, &QueueCandidate)> = candidates
        .iter()
        .map(|c| (queue_score(&c.factors, days_in_queue(c.added_at, now)), c))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .cmp(score_a)
            .then_with(|| a.added_at.cmp(&b.added_at))
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });

    scored
        .into_iter()
        .zip(1..)
        .map(|((score, candidate), position)| QueueStanding {
            entry_id: candidate.entry_id,
            score,
            position,
        })
        .collect()
}
