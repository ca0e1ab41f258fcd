// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Case-note queries.
//!
//! The four case-note tables share their lifecycle columns, so the list and
//! lookup functions are generated per table. Soft-deleted rows are only
//! returned when the caller asks for them.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::warn;

use crate::data_models::{
    EventRecordData, HousingRecordData, OtherRecordData, RecordMeta, SocialHelpRecordData,
};
use crate::diesel_schema::{event_records, housing_records, other_records, social_help_records};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = housing_records)]
pub(crate) struct HousingRecordRow {
    record_id: i64,
    repatriant_id: i64,
    contract_number: Option<String>,
    address: String,
    start_date: String,
    end_date: Option<String>,
    cost: Option<f64>,
    documents: Option<String>,
    notes: Option<String>,
    created_at: String,
    created_by: Option<i64>,
    is_deleted: bool,
    deleted_at: Option<String>,
    deleted_by: Option<i64>,
}

impl From<HousingRecordRow> for HousingRecordData {
    fn from(row: HousingRecordRow) -> Self {
        Self {
            record_id: row.record_id,
            repatriant_id: row.repatriant_id,
            contract_number: row.contract_number,
            address: row.address,
            start_date: row.start_date,
            end_date: row.end_date,
            cost: row.cost,
            documents: parse_paths(row.documents.as_deref()),
            notes: row.notes,
            meta: RecordMeta {
                created_at: row.created_at,
                created_by: row.created_by,
                is_deleted: row.is_deleted,
                deleted_at: row.deleted_at,
                deleted_by: row.deleted_by,
            },
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = social_help_records)]
pub(crate) struct SocialHelpRecordRow {
    record_id: i64,
    repatriant_id: i64,
    help_type: String,
    custom_help_type: Option<String>,
    responsible: Option<String>,
    help_date: String,
    amount: Option<String>,
    documents: Option<String>,
    description: Option<String>,
    created_at: String,
    created_by: Option<i64>,
    is_deleted: bool,
    deleted_at: Option<String>,
    deleted_by: Option<i64>,
}

impl From<SocialHelpRecordRow> for SocialHelpRecordData {
    fn from(row: SocialHelpRecordRow) -> Self {
        Self {
            record_id: row.record_id,
            repatriant_id: row.repatriant_id,
            help_type: row.help_type,
            custom_help_type: row.custom_help_type,
            responsible: row.responsible,
            help_date: row.help_date,
            amount: row.amount,
            documents: parse_paths(row.documents.as_deref()),
            description: row.description,
            meta: RecordMeta {
                created_at: row.created_at,
                created_by: row.created_by,
                is_deleted: row.is_deleted,
                deleted_at: row.deleted_at,
                deleted_by: row.deleted_by,
            },
        }
    }
}

/// Decodes a stored JSON list of file paths. A malformed list reads as empty.
pub(crate) fn parse_paths(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };

    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring malformed document list");
        Vec::new()
    })
}

/// Generates `list_<table>` and `get_<record>` for a case-note table.
macro_rules! case_note_queries {
    ($table:ident, $record:ident, $row:ty, $data:ty) => {
        pastey::paste! {
            /// Lists the records of a repatriant, newest first.
            ///
            /// # Errors
            ///
            /// Returns an error if the database query fails.
            pub fn [<list_ $table>](
                conn: &mut SqliteConnection,
                repatriant_id: i64,
                include_deleted: bool,
            ) -> Result<Vec<$data>, PersistenceError> {
                let mut statement = $table::table
                    .filter($table::repatriant_id.eq(repatriant_id))
                    .select(<$row>::as_select())
                    .into_boxed();

                if !include_deleted {
                    statement = statement.filter($table::is_deleted.eq(false));
                }

                let rows: Vec<$row> = statement
                    .order(($table::created_at.desc(), $table::record_id.desc()))
                    .load(conn)?;

                Ok(rows.into_iter().map(<$data>::from).collect())
            }

            /// Retrieves a single record.
            ///
            /// # Errors
            ///
            /// Returns an error if the database query fails.
            /// Returns `Ok(None)` if the record is not found, or is
            /// soft-deleted and `include_deleted` is false.
            pub fn [<get_ $record>](
                conn: &mut SqliteConnection,
                record_id: i64,
                include_deleted: bool,
            ) -> Result<Option<$data>, PersistenceError> {
                let mut statement = $table::table
                    .filter($table::record_id.eq(record_id))
                    .select(<$row>::as_select())
                    .into_boxed();

                if !include_deleted {
                    statement = statement.filter($table::is_deleted.eq(false));
                }

                match statement.first::<$row>(conn) {
                    Ok(row) => Ok(Some(<$data>::from(row))),
                    Err(diesel::result::Error::NotFound) => Ok(None),
                    Err(e) => Err(PersistenceError::from(e)),
                }
            }
        }
    };
}

case_note_queries!(
    housing_records,
    housing_record,
    HousingRecordRow,
    HousingRecordData
);
case_note_queries!(
    social_help_records,
    social_help_record,
    SocialHelpRecordRow,
    SocialHelpRecordData
);
case_note_queries!(event_records, event_record, EventRecordData, EventRecordData);
case_note_queries!(other_records, other_record, OtherRecordData, OtherRecordData);
