// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Housing waitlist mutations.
//!
//! A repatriant has at most one active entry. The partial unique index on
//! `housing_queue` enforces it; the explicit check gives the caller a
//! domain error instead of a constraint failure.

use diesel::SqliteConnection;
use diesel::prelude::*;
use repatria_domain::{
    DomainError, QueueCandidate, QueueFactors, QueueStanding, days_in_queue, format_timestamp,
    parse_timestamp, queue_score, rank_queue,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{QueueEntryData, RankedQueueEntry};
use crate::diesel_schema::housing_queue;
use crate::error::PersistenceError;
use crate::queries::queue::{active_entry_for_repatriant, get_queue_entry, list_active_entries};
use crate::queries::repatriants::{full_names, repatriant_exists};

/// Adds a repatriant to the queue with a freshly computed score.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist and
/// `Domain(AlreadyQueued)` if it already has an active entry.
pub fn add_to_queue(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    factors: QueueFactors,
    added_by: i64,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        if !repatriant_exists(conn, repatriant_id)? {
            return Err(PersistenceError::NotFound(format!(
                "Repatriant {repatriant_id} not found"
            )));
        }

        if active_entry_for_repatriant(conn, repatriant_id)?.is_some() {
            return Err(DomainError::AlreadyQueued { repatriant_id }.into());
        }

        diesel::insert_into(housing_queue::table)
            .values((
                housing_queue::repatriant_id.eq(repatriant_id),
                housing_queue::has_children.eq(factors.has_children),
                housing_queue::has_work.eq(factors.has_work),
                housing_queue::has_law_violations.eq(factors.has_law_violations),
                housing_queue::total_score.eq(queue_score(&factors, 0)),
                housing_queue::added_at.eq(format_timestamp(now)),
                housing_queue::added_by.eq(added_by),
            ))
            .execute(conn)
            .map_err(|e| match PersistenceError::from(e) {
                PersistenceError::UniqueViolation(_) => {
                    DomainError::AlreadyQueued { repatriant_id }.into()
                }
                other => other,
            })?;

        let entry_id: i64 = get_last_insert_rowid(conn)?;
        info!(entry_id, repatriant_id, "Added repatriant to housing queue");
        Ok(entry_id)
    })
}

/// Replaces the scoring flags of an active entry and rescores it.
///
/// # Errors
///
/// Returns `NotFound` if there is no active entry with the ID.
pub fn update_queue_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
    factors: QueueFactors,
    now: OffsetDateTime,
) -> Result<QueueEntryData, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let entry: QueueEntryData = active_entry(conn, entry_id)?;
        let added_at: OffsetDateTime = parse_timestamp(&entry.added_at)?;
        let score: i64 = queue_score(&factors, days_in_queue(added_at, now));

        diesel::update(housing_queue::table)
            .filter(housing_queue::entry_id.eq(entry_id))
            .set((
                housing_queue::has_children.eq(factors.has_children),
                housing_queue::has_work.eq(factors.has_work),
                housing_queue::has_law_violations.eq(factors.has_law_violations),
                housing_queue::total_score.eq(score),
            ))
            .execute(conn)?;

        info!(entry_id, score, "Updated housing queue entry");
        active_entry(conn, entry_id)
    })
}

/// Takes an entry out of the queue. The row is kept with its removal
/// bookkeeping and the repatriant may be queued again.
///
/// # Errors
///
/// Returns `NotFound` if there is no active entry with the ID.
pub fn remove_from_queue(
    conn: &mut SqliteConnection,
    entry_id: i64,
    removed_by: i64,
    now: OffsetDateTime,
) -> Result<QueueEntryData, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let entry: QueueEntryData = active_entry(conn, entry_id)?;

        diesel::update(housing_queue::table)
            .filter(housing_queue::entry_id.eq(entry_id))
            .set((
                housing_queue::is_active.eq(false),
                housing_queue::queue_position.eq(None::<i32>),
                housing_queue::removed_at.eq(format_timestamp(now)),
                housing_queue::removed_by.eq(removed_by),
            ))
            .execute(conn)?;

        info!(
            entry_id,
            repatriant_id = entry.repatriant_id,
            "Removed repatriant from housing queue"
        );

        get_queue_entry(conn, entry_id)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("Queue entry {entry_id} not found"))
        })
    })
}

fn active_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
) -> Result<QueueEntryData, PersistenceError> {
    match get_queue_entry(conn, entry_id)? {
        Some(entry) if entry.is_active => Ok(entry),
        _ => Err(PersistenceError::NotFound(format!(
            "Queue entry {entry_id} not found"
        ))),
    }
}

/// Recomputes every active score against `now`, persists scores and
/// positions, and returns the ranked queue.
///
/// Entries whose repatriant has no name on record are labelled `#<id>`.
///
/// # Errors
///
/// Returns an error if a stored `added_at` cannot be parsed or a write
/// fails; nothing is written in either case.
pub fn rank_active_queue(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<Vec<RankedQueueEntry>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let entries: Vec<QueueEntryData> = list_active_entries(conn)?;

        let candidates: Vec<QueueCandidate> = entries
            .iter()
            .map(|entry| {
                Ok(QueueCandidate {
                    entry_id: entry.entry_id,
                    factors: QueueFactors::new(
                        entry.has_children,
                        entry.has_work,
                        entry.has_law_violations,
                    ),
                    added_at: parse_timestamp(&entry.added_at)?,
                })
            })
            .collect::<Result<Vec<QueueCandidate>, DomainError>>()?;

        let standings: Vec<QueueStanding> = rank_queue(&candidates, now);

        for standing in &standings {
            diesel::update(housing_queue::table)
                .filter(housing_queue::entry_id.eq(standing.entry_id))
                .set((
                    housing_queue::total_score.eq(standing.score),
                    housing_queue::queue_position.eq(standing.position),
                ))
                .execute(conn)?;
        }

        let repatriant_ids: Vec<i64> = entries.iter().map(|e| e.repatriant_id).collect();
        let names = full_names(conn, &repatriant_ids)?;

        let mut ranked: Vec<RankedQueueEntry> = Vec::with_capacity(standings.len());
        for standing in standings {
            let Some(mut entry) = entries
                .iter()
                .find(|e| e.entry_id == standing.entry_id)
                .cloned()
            else {
                continue;
            };
            entry.total_score = standing.score;
            entry.queue_position = Some(standing.position);

            let full_name: String = names
                .get(&entry.repatriant_id)
                .filter(|name| !name.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("#{}", entry.repatriant_id));

            ranked.push(RankedQueueEntry { entry, full_name });
        }

        debug!(entries = ranked.len(), "Ranked housing queue");
        Ok(ranked)
    })
}
