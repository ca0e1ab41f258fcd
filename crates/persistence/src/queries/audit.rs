// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit trail queries.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::LogEntryData;
use crate::diesel_schema::action_log;
use crate::error::PersistenceError;

/// Rows per page of the admin log view.
pub const LOG_PAGE_SIZE: i64 = 50;

/// One page of the audit trail, newest first, with the total row count.
///
/// Pages are 1-based; page 0 is treated as page 1.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_logs(
    conn: &mut SqliteConnection,
    page: i64,
) -> Result<(Vec<LogEntryData>, i64), PersistenceError> {
    let total: i64 = action_log::table.count().get_result(conn)?;
    let offset: i64 = (page.max(1) - 1).saturating_mul(LOG_PAGE_SIZE);

    let rows: Vec<LogEntryData> = action_log::table
        .order(action_log::log_id.desc())
        .limit(LOG_PAGE_SIZE)
        .offset(offset)
        .select(LogEntryData::as_select())
        .load(conn)?;

    Ok((rows, total))
}

/// The full history of a repatriant, newest first.
///
/// Entries survive the deletion of the repatriant.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn logs_for_repatriant(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
) -> Result<Vec<LogEntryData>, PersistenceError> {
    Ok(action_log::table
        .filter(action_log::repatriant_id.eq(repatriant_id))
        .order(action_log::log_id.desc())
        .select(LogEntryData::as_select())
        .load(conn)?)
}

/// The whole audit trail, newest first. Used by the exports.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_all_logs(conn: &mut SqliteConnection) -> Result<Vec<LogEntryData>, PersistenceError> {
    Ok(action_log::table
        .order(action_log::log_id.desc())
        .select(LogEntryData::as_select())
        .load(conn)?)
}
