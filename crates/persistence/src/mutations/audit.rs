// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit trail persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use repatria_audit::AuditEntry;
use repatria_domain::{format_date, format_time_of_day};
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::action_log;
use crate::error::PersistenceError;

/// Appends an entry to the audit trail.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_log_entry(
    conn: &mut SqliteConnection,
    entry: &AuditEntry,
    at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let at: OffsetDateTime = at.to_offset(time::UtcOffset::UTC);

    diesel::insert_into(action_log::table)
        .values((
            action_log::repatriant_id.eq(entry.repatriant_id),
            action_log::user_id.eq(entry.actor.user_id),
            action_log::username.eq(&entry.actor.username),
            action_log::action_name.eq(&entry.action.name),
            action_log::action_text.eq(entry.action_text()),
            action_log::logged_on.eq(format_date(at.date())),
            action_log::logged_at.eq(format_time_of_day(at)),
        ))
        .execute(conn)?;

    let log_id: i64 = get_last_insert_rowid(conn)?;
    debug!(log_id, "{}", entry.describe());
    Ok(log_id)
}
