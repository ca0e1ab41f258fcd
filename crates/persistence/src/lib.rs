// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Repatria case registry.
//!
//! This crate owns the `SQLite` schema, its embedded migrations, and every
//! query and mutation the application performs. It is built on Diesel.
//!
//! ## Layout
//!
//! - `backend` — connection setup, PRAGMAs, custom SQL functions
//! - `queries` — read-only operations
//! - `mutations` — state-changing operations
//! - `data_models` — records returned to and inputs accepted from callers
//!
//! ## Testing
//!
//! Tests run against isolated in-memory databases created with
//! [`Persistence::new_in_memory`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::SqliteConnection;
use repatria_audit::AuditEntry;
use repatria_domain::{QueueFactors, Role, SearchMode};
use time::OffsetDateTime;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sql_functions;

#[cfg(test)]
mod tests;

pub use data_models::{
    ChildData, CountRow, DependentInput, EventRecordChanges, EventRecordData, Family,
    FamilyMemberData, HousingDepartmentInput, HousingDepartmentRecordData, HousingDocument,
    HousingRecordChanges, HousingRecordData, LogEntryData, NewEventRecord, NewHousingRecord,
    NewOtherRecord, NewSocialHelpRecord, OtherRecordChanges, OtherRecordData, QueueEntryData,
    RankedQueueEntry, RecordMeta, RepatriantChanges, RepatriantData, RepatriantFields,
    RepatriantSummary, SearchPage, SessionData, SocialHelpRecordChanges, SocialHelpRecordData,
    UserData,
};
pub use error::PersistenceError;
pub use queries::audit::LOG_PAGE_SIZE;
pub use queries::repatriants::LOOKUP_LIMIT;
pub use queries::reports::{CaseNoteCounts, UserActivity};

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

/// Generates the `Persistence` methods of one case-note kind.
macro_rules! case_note_methods {
    ($table:ident, $record:ident, $data:ty, $new:ty, $changes:ty) => {
        pastey::paste! {
            /// Lists the records of a repatriant, newest first.
            ///
            /// # Errors
            ///
            /// Returns an error if the database query fails.
            pub fn [<list_ $table>](
                &mut self,
                repatriant_id: i64,
                include_deleted: bool,
            ) -> Result<Vec<$data>, PersistenceError> {
                queries::case_notes::[<list_ $table>](&mut self.conn, repatriant_id, include_deleted)
            }

            /// Retrieves one record.
            ///
            /// # Errors
            ///
            /// Returns an error if the database query fails.
            pub fn [<get_ $record>](
                &mut self,
                record_id: i64,
                include_deleted: bool,
            ) -> Result<Option<$data>, PersistenceError> {
                queries::case_notes::[<get_ $record>](&mut self.conn, record_id, include_deleted)
            }

            /// Creates a record for a repatriant.
            ///
            /// # Errors
            ///
            /// Returns `NotFound` if the repatriant does not exist.
            pub fn [<create_ $record>](
                &mut self,
                repatriant_id: i64,
                record: &$new,
                created_by: i64,
            ) -> Result<i64, PersistenceError> {
                mutations::case_notes::[<create_ $record>](
                    &mut self.conn,
                    repatriant_id,
                    record,
                    created_by,
                )
            }

            /// Partially updates an active record and returns its repatriant ID.
            ///
            /// # Errors
            ///
            /// Returns `NotFound` if there is no active record with the ID.
            pub fn [<update_ $record>](
                &mut self,
                record_id: i64,
                changes: &$changes,
            ) -> Result<i64, PersistenceError> {
                mutations::case_notes::[<update_ $record>](&mut self.conn, record_id, changes)
            }

            /// Soft-deletes an active record and returns its repatriant ID.
            ///
            /// # Errors
            ///
            /// Returns `NotFound` if there is no active record with the ID.
            pub fn [<soft_delete_ $record>](
                &mut self,
                record_id: i64,
                deleted_by: i64,
            ) -> Result<i64, PersistenceError> {
                mutations::case_notes::[<soft_delete_ $record>](&mut self.conn, record_id, deleted_by)
            }

            /// Restores a soft-deleted record and returns its repatriant ID.
            ///
            /// # Errors
            ///
            /// Returns `NotFound` if there is no deleted record with the ID.
            pub fn [<restore_ $record>](&mut self, record_id: i64) -> Result<i64, PersistenceError> {
                mutations::case_notes::[<restore_ $record>](&mut self.conn, record_id)
            }
        }
    };
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database, so tests are
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Repatriants
    // ========================================================================

    /// Registers a repatriant with its dependents and returns the new ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails; nothing is written in that case.
    pub fn register_repatriant(
        &mut self,
        fields: &RepatriantFields,
        dependents: &[DependentInput],
    ) -> Result<i64, PersistenceError> {
        mutations::repatriants::register_repatriant(&mut self.conn, fields, dependents)
    }

    /// Partially updates a repatriant; `dependents` replaces the stored set
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the repatriant does not exist.
    pub fn update_repatriant(
        &mut self,
        repatriant_id: i64,
        changes: &RepatriantChanges,
        dependents: Option<&[DependentInput]>,
    ) -> Result<(), PersistenceError> {
        mutations::repatriants::update_repatriant(
            &mut self.conn,
            repatriant_id,
            changes,
            dependents,
        )
    }

    /// Hard-deletes a repatriant and everything that hangs off it except
    /// the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the repatriant does not exist.
    pub fn delete_repatriant(&mut self, repatriant_id: i64) -> Result<(), PersistenceError> {
        mutations::repatriants::delete_repatriant(&mut self.conn, repatriant_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_repatriant(
        &mut self,
        repatriant_id: i64,
    ) -> Result<Option<RepatriantData>, PersistenceError> {
        queries::repatriants::get_repatriant(&mut self.conn, repatriant_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_family(&mut self, repatriant_id: i64) -> Result<Family, PersistenceError> {
        queries::repatriants::get_family(&mut self.conn, repatriant_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_repatriants(&mut self) -> Result<i64, PersistenceError> {
        queries::repatriants::count_repatriants(&mut self.conn)
    }

    /// Counts repatriants registered on a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_registered_on(&mut self, date: &str) -> Result<i64, PersistenceError> {
        queries::repatriants::count_registered_on(&mut self.conn, date)
    }

    /// Picker lookup by full-name phrase or file code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn lookup_repatriants(
        &mut self,
        query: &str,
    ) -> Result<Vec<RepatriantSummary>, PersistenceError> {
        queries::repatriants::lookup_repatriants(&mut self.conn, query)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_all_repatriants(&mut self) -> Result<Vec<RepatriantData>, PersistenceError> {
        queries::repatriants::list_all_repatriants(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_all_children(&mut self) -> Result<Vec<ChildData>, PersistenceError> {
        queries::repatriants::list_all_children(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_all_family_members(&mut self) -> Result<Vec<FamilyMemberData>, PersistenceError> {
        queries::repatriants::list_all_family_members(&mut self.conn)
    }

    /// Full names of the given repatriants keyed by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn full_names(&mut self, ids: &[i64]) -> Result<HashMap<i64, String>, PersistenceError> {
        queries::repatriants::full_names(&mut self.conn, ids)
    }

    /// Runs a search and returns one page.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub fn search_repatriants(
        &mut self,
        mode: &SearchMode,
        role: Role,
        page: i64,
        current_year: i32,
    ) -> Result<SearchPage, PersistenceError> {
        queries::search::search_repatriants(&mut self.conn, mode, role, page, current_year)
    }

    // ========================================================================
    // Users & Sessions
    // ========================================================================

    /// Creates a user and returns the new ID.
    ///
    /// # Errors
    ///
    /// Returns `Domain(DuplicateUsername)` if the username is taken.
    pub fn create_user(
        &mut self,
        username: &str,
        password: &str,
        full_name: &str,
        role: Role,
        created_by: Option<i64>,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_user(
            &mut self.conn,
            username,
            password,
            full_name,
            role,
            created_by,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_username(&mut self.conn, username)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_active_users(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn recent_logins(&mut self, limit: i64) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::recent_logins(&mut self.conn, limit)
    }

    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(&mut self, user_id: i64, at: &str) -> Result<(), PersistenceError> {
        mutations::users::update_last_login(&mut self.conn, user_id, at)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn set_user_active(&mut self, user_id: i64, is_active: bool) -> Result<(), PersistenceError> {
        mutations::users::set_user_active(&mut self.conn, user_id, is_active)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn delete_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        mutations::users::delete_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        now: &str,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(&mut self.conn, session_token, user_id, now, expires_at)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn touch_session(
        &mut self,
        session_id: i64,
        now: &str,
        expires_at: &str,
    ) -> Result<(), PersistenceError> {
        mutations::users::touch_session(&mut self.conn, session_id, now, expires_at)
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        mutations::users::delete_sessions_for_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Case Notes
    // ========================================================================

    case_note_methods!(
        housing_records,
        housing_record,
        HousingRecordData,
        NewHousingRecord,
        HousingRecordChanges
    );
    case_note_methods!(
        social_help_records,
        social_help_record,
        SocialHelpRecordData,
        NewSocialHelpRecord,
        SocialHelpRecordChanges
    );
    case_note_methods!(
        event_records,
        event_record,
        EventRecordData,
        NewEventRecord,
        EventRecordChanges
    );
    case_note_methods!(
        other_records,
        other_record,
        OtherRecordData,
        NewOtherRecord,
        OtherRecordChanges
    );

    // ========================================================================
    // Housing Department
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_housing_department_records(
        &mut self,
        repatriant_id: i64,
        include_deleted: bool,
    ) -> Result<Vec<HousingDepartmentRecordData>, PersistenceError> {
        queries::housing_department::list_housing_department_records(
            &mut self.conn,
            repatriant_id,
            include_deleted,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_housing_department_record(
        &mut self,
        record_id: i64,
        include_deleted: bool,
    ) -> Result<Option<HousingDepartmentRecordData>, PersistenceError> {
        queries::housing_department::get_housing_department_record(
            &mut self.conn,
            record_id,
            include_deleted,
        )
    }

    /// The latest active record per repatriant, for search result pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn latest_housing_department_records(
        &mut self,
        repatriant_ids: &[i64],
    ) -> Result<HashMap<i64, HousingDepartmentRecordData>, PersistenceError> {
        queries::housing_department::latest_housing_department_records(
            &mut self.conn,
            repatriant_ids,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_housing_department_records(&mut self) -> Result<i64, PersistenceError> {
        queries::housing_department::count_housing_department_records(&mut self.conn)
    }

    /// Creates a record; `family` replaces the dependents when given.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the repatriant does not exist.
    pub fn create_housing_department_record(
        &mut self,
        repatriant_id: i64,
        input: HousingDepartmentInput,
        created_by: i64,
        family: Option<&[DependentInput]>,
    ) -> Result<i64, PersistenceError> {
        mutations::housing_department::create_housing_department_record(
            &mut self.conn,
            repatriant_id,
            input,
            created_by,
            family,
        )
    }

    /// Rewrites a record and returns its repatriant ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no active record with the ID.
    pub fn update_housing_department_record(
        &mut self,
        record_id: i64,
        input: HousingDepartmentInput,
        family: Option<&[DependentInput]>,
    ) -> Result<i64, PersistenceError> {
        mutations::housing_department::update_housing_department_record(
            &mut self.conn,
            record_id,
            input,
            family,
        )
    }

    /// # Errors
    ///
    /// Returns `NotFound` if there is no active record with the ID.
    pub fn soft_delete_housing_department_record(
        &mut self,
        record_id: i64,
        deleted_by: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::housing_department::soft_delete_housing_department_record(
            &mut self.conn,
            record_id,
            deleted_by,
        )
    }

    /// # Errors
    ///
    /// Returns `NotFound` if there is no deleted record with the ID.
    pub fn restore_housing_department_record(
        &mut self,
        record_id: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::housing_department::restore_housing_department_record(&mut self.conn, record_id)
    }

    // ========================================================================
    // Housing Queue
    // ========================================================================

    /// # Errors
    ///
    /// Returns `NotFound` for an unknown repatriant and
    /// `Domain(AlreadyQueued)` for one that is already queued.
    pub fn add_to_queue(
        &mut self,
        repatriant_id: i64,
        factors: QueueFactors,
        added_by: i64,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::queue::add_to_queue(&mut self.conn, repatriant_id, factors, added_by, now)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if there is no active entry with the ID.
    pub fn update_queue_entry(
        &mut self,
        entry_id: i64,
        factors: QueueFactors,
        now: OffsetDateTime,
    ) -> Result<QueueEntryData, PersistenceError> {
        mutations::queue::update_queue_entry(&mut self.conn, entry_id, factors, now)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if there is no active entry with the ID.
    pub fn remove_from_queue(
        &mut self,
        entry_id: i64,
        removed_by: i64,
        now: OffsetDateTime,
    ) -> Result<QueueEntryData, PersistenceError> {
        mutations::queue::remove_from_queue(&mut self.conn, entry_id, removed_by, now)
    }

    /// Rescores and reorders the active queue, persisting the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored timestamp is malformed or a write fails.
    pub fn rank_active_queue(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<Vec<RankedQueueEntry>, PersistenceError> {
        mutations::queue::rank_active_queue(&mut self.conn, now)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_queue_entry(
        &mut self,
        entry_id: i64,
    ) -> Result<Option<QueueEntryData>, PersistenceError> {
        queries::queue::get_queue_entry(&mut self.conn, entry_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn active_queue_entry_for(
        &mut self,
        repatriant_id: i64,
    ) -> Result<Option<QueueEntryData>, PersistenceError> {
        queries::queue::active_entry_for_repatriant(&mut self.conn, repatriant_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active_queue_entries(&mut self) -> Result<i64, PersistenceError> {
        queries::queue::count_active_entries(&mut self.conn)
    }

    // ========================================================================
    // Audit Trail
    // ========================================================================

    /// Appends an entry stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn log_action(&mut self, entry: &AuditEntry) -> Result<i64, PersistenceError> {
        mutations::audit::append_log_entry(&mut self.conn, entry, OffsetDateTime::now_utc())
    }

    /// Appends an entry stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn log_action_at(
        &mut self,
        entry: &AuditEntry,
        at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::audit::append_log_entry(&mut self.conn, entry, at)
    }

    /// One page of [`LOG_PAGE_SIZE`] entries and the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_logs(&mut self, page: i64) -> Result<(Vec<LogEntryData>, i64), PersistenceError> {
        queries::audit::list_logs(&mut self.conn, page)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn logs_for_repatriant(
        &mut self,
        repatriant_id: i64,
    ) -> Result<Vec<LogEntryData>, PersistenceError> {
        queries::audit::logs_for_repatriant(&mut self.conn, repatriant_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_all_logs(&mut self) -> Result<Vec<LogEntryData>, PersistenceError> {
        queries::audit::list_all_logs(&mut self.conn)
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn case_note_counts(&mut self) -> Result<CaseNoteCounts, PersistenceError> {
        queries::reports::case_note_counts(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn repatriants_by_sex(&mut self) -> Result<Vec<CountRow>, PersistenceError> {
        queries::reports::repatriants_by_sex(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn repatriants_by_family_status(&mut self) -> Result<Vec<CountRow>, PersistenceError> {
        queries::reports::repatriants_by_family_status(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn top_origins(&mut self) -> Result<Vec<CountRow>, PersistenceError> {
        queries::reports::top_origins(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn top_nationalities(&mut self) -> Result<Vec<CountRow>, PersistenceError> {
        queries::reports::top_nationalities(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn help_type_counts(&mut self) -> Result<Vec<CountRow>, PersistenceError> {
        queries::reports::help_type_counts(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn event_type_counts(&mut self) -> Result<Vec<CountRow>, PersistenceError> {
        queries::reports::event_type_counts(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn user_activity(&mut self) -> Result<Vec<UserActivity>, PersistenceError> {
        queries::reports::user_activity(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn large_families(&mut self) -> Result<Vec<(RepatriantSummary, i64)>, PersistenceError> {
        queries::reports::large_families(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn repatriants_without_dependents(
        &mut self,
    ) -> Result<Vec<RepatriantSummary>, PersistenceError> {
        queries::reports::repatriants_without_dependents(&mut self.conn)
    }
}
