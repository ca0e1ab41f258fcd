// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules.
//!
//! This module contains all state-changing operations for the persistence
//! layer. Multi-statement writes run inside a single transaction.
//!
//! ## Module Organization
//!
//! - `repatriants` — Register, edit, delete, dependent replacement
//! - `users` — Operators and sessions
//! - `case_notes` — Case-note create, update, soft delete, restore
//! - `housing_department` — Housing department records
//! - `queue` — Housing waitlist and its ranking
//! - `audit` — Audit trail appends

/// Generates `soft_delete_<record>` and `restore_<record>` for a table
/// carrying the `is_deleted` / `deleted_at` / `deleted_by` triple.
///
/// Both return the owning repatriant ID so callers can log against it.
macro_rules! soft_delete_lifecycle {
    ($table:ident, $record:ident) => {
        pastey::paste! {
            /// Marks an active record as deleted.
            ///
            /// # Errors
            ///
            /// Returns `NotFound` if there is no active record with the ID.
            pub fn [<soft_delete_ $record>](
                conn: &mut SqliteConnection,
                record_id: i64,
                deleted_by: i64,
            ) -> Result<i64, PersistenceError> {
                let repatriant_id: i64 = match $table::table
                    .filter($table::record_id.eq(record_id))
                    .filter($table::is_deleted.eq(false))
                    .select($table::repatriant_id)
                    .first(conn)
                {
                    Ok(id) => id,
                    Err(diesel::result::Error::NotFound) => {
                        return Err(PersistenceError::NotFound(format!(
                            "{} {record_id} not found",
                            stringify!($record)
                        )));
                    }
                    Err(e) => return Err(PersistenceError::from(e)),
                };

                diesel::update($table::table)
                    .filter($table::record_id.eq(record_id))
                    .set((
                        $table::is_deleted.eq(true),
                        $table::deleted_at.eq(diesel::dsl::sql::<
                            diesel::sql_types::Nullable<diesel::sql_types::Text>,
                        >("CURRENT_TIMESTAMP")),
                        $table::deleted_by.eq(deleted_by),
                    ))
                    .execute(conn)?;

                tracing::info!(record_id, deleted_by, "Soft-deleted {}", stringify!($record));
                Ok(repatriant_id)
            }

            /// Restores a soft-deleted record.
            ///
            /// # Errors
            ///
            /// Returns `NotFound` if there is no deleted record with the ID.
            pub fn [<restore_ $record>](
                conn: &mut SqliteConnection,
                record_id: i64,
            ) -> Result<i64, PersistenceError> {
                let repatriant_id: i64 = match $table::table
                    .filter($table::record_id.eq(record_id))
                    .filter($table::is_deleted.eq(true))
                    .select($table::repatriant_id)
                    .first(conn)
                {
                    Ok(id) => id,
                    Err(diesel::result::Error::NotFound) => {
                        return Err(PersistenceError::NotFound(format!(
                            "deleted {} {record_id} not found",
                            stringify!($record)
                        )));
                    }
                    Err(e) => return Err(PersistenceError::from(e)),
                };

                diesel::update($table::table)
                    .filter($table::record_id.eq(record_id))
                    .set((
                        $table::is_deleted.eq(false),
                        $table::deleted_at.eq(None::<String>),
                        $table::deleted_by.eq(None::<i64>),
                    ))
                    .execute(conn)?;

                tracing::info!(record_id, "Restored {}", stringify!($record));
                Ok(repatriant_id)
            }
        }
    };
}

pub mod audit;
pub mod case_notes;
pub mod housing_department;
pub mod queue;
pub mod repatriants;
pub mod users;
