// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Housing waitlist queries.
//!
//! Stored scores and positions are only as fresh as the last ranking; the
//! ranked view is produced by `mutations::queue::rank_active_queue`.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::QueueEntryData;
use crate::diesel_schema::housing_queue;
use crate::error::PersistenceError;

/// Retrieves a queue entry by ID, active or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the entry is not found.
pub fn get_queue_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
) -> Result<Option<QueueEntryData>, PersistenceError> {
    let result: Result<QueueEntryData, diesel::result::Error> = housing_queue::table
        .filter(housing_queue::entry_id.eq(entry_id))
        .select(QueueEntryData::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// The active entry of a repatriant, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn active_entry_for_repatriant(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
) -> Result<Option<QueueEntryData>, PersistenceError> {
    let result: Result<QueueEntryData, diesel::result::Error> = housing_queue::table
        .filter(housing_queue::repatriant_id.eq(repatriant_id))
        .filter(housing_queue::is_active.eq(true))
        .select(QueueEntryData::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// All active entries in insertion order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_active_entries(
    conn: &mut SqliteConnection,
) -> Result<Vec<QueueEntryData>, PersistenceError> {
    Ok(housing_queue::table
        .filter(housing_queue::is_active.eq(true))
        .order(housing_queue::entry_id.asc())
        .select(QueueEntryData::as_select())
        .load(conn)?)
}

/// Counts active entries.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_active_entries(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(housing_queue::table
        .filter(housing_queue::is_active.eq(true))
        .count()
        .get_result(conn)?)
}
