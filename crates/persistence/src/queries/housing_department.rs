// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Housing department record queries.

use std::collections::HashMap;

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::warn;

use crate::data_models::{
    HousingDepartmentRecordData, HousingDocument, RecordMeta, StoredHousingDocument,
};
use crate::diesel_schema::housing_department_records;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = housing_department_records)]
struct HousingDepartmentRow {
    record_id: i64,
    repatriant_id: i64,
    category: Option<String>,
    received_housing: bool,
    housing_type: Option<String>,
    housing_acquisition: Option<String>,
    address: Option<String>,
    has_warrant: bool,
    repair_amount: Option<f64>,
    documents: Option<String>,
    notes: Option<String>,
    protocol_number: Option<String>,
    created_at: String,
    created_by: Option<i64>,
    is_deleted: bool,
    deleted_at: Option<String>,
    deleted_by: Option<i64>,
}

impl From<HousingDepartmentRow> for HousingDepartmentRecordData {
    fn from(row: HousingDepartmentRow) -> Self {
        Self {
            record_id: row.record_id,
            repatriant_id: row.repatriant_id,
            category: row.category,
            received_housing: row.received_housing,
            housing_type: row.housing_type,
            housing_acquisition: row.housing_acquisition,
            address: row.address,
            has_warrant: row.has_warrant,
            repair_amount: row.repair_amount,
            documents: parse_documents(row.documents.as_deref()),
            notes: row.notes,
            protocol_number: row.protocol_number,
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

/// Decodes the stored document list, accepting both `{path, name}` objects
/// and bare path strings.
pub(crate) fn parse_documents(raw: Option<&str>) -> Vec<HousingDocument> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<StoredHousingDocument>>(raw) {
        Ok(stored) => stored.into_iter().map(HousingDocument::from).collect(),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed housing document list");
            Vec::new()
        }
    }
}

/// Lists the housing department records of a repatriant, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_housing_department_records(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    include_deleted: bool,
) -> Result<Vec<HousingDepartmentRecordData>, PersistenceError> {
    let mut statement = housing_department_records::table
        .filter(housing_department_records::repatriant_id.eq(repatriant_id))
        .select(HousingDepartmentRow::as_select())
        .into_boxed();

    if !include_deleted {
        statement = statement.filter(housing_department_records::is_deleted.eq(false));
    }

    let rows: Vec<HousingDepartmentRow> = statement
        .order((
            housing_department_records::created_at.desc(),
            housing_department_records::record_id.desc(),
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(HousingDepartmentRecordData::from)
        .collect())
}

/// Retrieves a housing department record.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the record is not found, or is soft-deleted and
/// `include_deleted` is false.
pub fn get_housing_department_record(
    conn: &mut SqliteConnection,
    record_id: i64,
    include_deleted: bool,
) -> Result<Option<HousingDepartmentRecordData>, PersistenceError> {
    let mut statement = housing_department_records::table
        .filter(housing_department_records::record_id.eq(record_id))
        .select(HousingDepartmentRow::as_select())
        .into_boxed();

    if !include_deleted {
        statement = statement.filter(housing_department_records::is_deleted.eq(false));
    }

    match statement.first::<HousingDepartmentRow>(conn) {
        Ok(row) => Ok(Some(HousingDepartmentRecordData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// The most recent non-deleted record of each listed repatriant.
///
/// Repatriants without a record are absent from the map.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn latest_housing_department_records(
    conn: &mut SqliteConnection,
    repatriant_ids: &[i64],
) -> Result<HashMap<i64, HousingDepartmentRecordData>, PersistenceError> {
    if repatriant_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<HousingDepartmentRow> = housing_department_records::table
        .filter(housing_department_records::repatriant_id.eq_any(repatriant_ids))
        .filter(housing_department_records::is_deleted.eq(false))
        .order((
            housing_department_records::created_at.desc(),
            housing_department_records::record_id.desc(),
        ))
        .select(HousingDepartmentRow::as_select())
        .load(conn)?;

    let mut latest: HashMap<i64, HousingDepartmentRecordData> = HashMap::new();
    for row in rows {
        latest
            .entry(row.repatriant_id)
            .or_insert_with(|| HousingDepartmentRecordData::from(row));
    }
    Ok(latest)
}

/// Counts non-deleted housing department records.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_housing_department_records(
    conn: &mut SqliteConnection,
) -> Result<i64, PersistenceError> {
    Ok(housing_department_records::table
        .filter(housing_department_records::is_deleted.eq(false))
        .count()
        .get_result(conn)?)
}
