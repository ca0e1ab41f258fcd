// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Case-note mutations.
//!
//! Updates are partial: `None` fields keep the stored value. Updates only
//! touch active records.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{
    EventRecordChanges, HousingRecordChangeset, HousingRecordChanges, NewEventRecord,
    NewHousingRecord, NewOtherRecord, NewSocialHelpRecord, OtherRecordChanges,
    SocialHelpRecordChangeset, SocialHelpRecordChanges,
};
use crate::diesel_schema::{event_records, housing_records, other_records, social_help_records};
use crate::error::PersistenceError;
use crate::queries::repatriants::repatriant_exists;

fn require_repatriant(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
) -> Result<(), PersistenceError> {
    if repatriant_exists(conn, repatriant_id)? {
        Ok(())
    } else {
        Err(PersistenceError::NotFound(format!(
            "Repatriant {repatriant_id} not found"
        )))
    }
}

fn encode_paths(paths: &[String]) -> Result<Option<String>, PersistenceError> {
    if paths.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(paths)?))
    }
}

/// The owning repatriant of an active record, or `NotFound`.
macro_rules! active_owner {
    ($conn:expr, $table:ident, $record_id:expr) => {
        match $table::table
            .filter($table::record_id.eq($record_id))
            .filter($table::is_deleted.eq(false))
            .select($table::repatriant_id)
            .first::<i64>($conn)
        {
            Ok(id) => Ok(id),
            Err(diesel::result::Error::NotFound) => Err(PersistenceError::NotFound(format!(
                "{} {} not found",
                stringify!($table),
                $record_id
            ))),
            Err(e) => Err(PersistenceError::from(e)),
        }
    };
}

/// Creates a housing record.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist, or an error if the
/// insert fails.
pub fn create_housing_record(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    record: &NewHousingRecord,
    created_by: i64,
) -> Result<i64, PersistenceError> {
    require_repatriant(conn, repatriant_id)?;

    diesel::insert_into(housing_records::table)
        .values((
            housing_records::repatriant_id.eq(repatriant_id),
            housing_records::contract_number.eq(&record.contract_number),
            housing_records::address.eq(&record.address),
            housing_records::start_date.eq(&record.start_date),
            housing_records::end_date.eq(&record.end_date),
            housing_records::cost.eq(record.cost),
            housing_records::documents.eq(encode_paths(&record.documents)?),
            housing_records::notes.eq(&record.notes),
            housing_records::created_by.eq(created_by),
        ))
        .execute(conn)?;

    let record_id: i64 = get_last_insert_rowid(conn)?;
    info!(record_id, repatriant_id, "Created housing record");
    Ok(record_id)
}

/// Updates an active housing record and returns its repatriant ID.
///
/// # Errors
///
/// Returns `NotFound` if there is no active record with the ID.
pub fn update_housing_record(
    conn: &mut SqliteConnection,
    record_id: i64,
    changes: &HousingRecordChanges,
) -> Result<i64, PersistenceError> {
    let repatriant_id: i64 = active_owner!(conn, housing_records, record_id)?;
    if *changes == HousingRecordChanges::default() {
        return Ok(repatriant_id);
    }

    let documents: Option<String> = match &changes.documents {
        Some(paths) => Some(serde_json::to_string(paths)?),
        None => None,
    };

    diesel::update(housing_records::table)
        .filter(housing_records::record_id.eq(record_id))
        .set(HousingRecordChangeset {
            contract_number: changes.contract_number.clone(),
            address: changes.address.clone(),
            start_date: changes.start_date.clone(),
            end_date: changes.end_date.clone(),
            cost: changes.cost,
            documents,
            notes: changes.notes.clone(),
        })
        .execute(conn)?;

    info!(record_id, "Updated housing record");
    Ok(repatriant_id)
}

/// Creates a social help record.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist, or an error if the
/// insert fails.
pub fn create_social_help_record(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    record: &NewSocialHelpRecord,
    created_by: i64,
) -> Result<i64, PersistenceError> {
    require_repatriant(conn, repatriant_id)?;

    diesel::insert_into(social_help_records::table)
        .values((
            social_help_records::repatriant_id.eq(repatriant_id),
            social_help_records::help_type.eq(&record.help_type),
            social_help_records::custom_help_type.eq(&record.custom_help_type),
            social_help_records::responsible.eq(&record.responsible),
            social_help_records::help_date.eq(&record.help_date),
            social_help_records::amount.eq(&record.amount),
            social_help_records::documents.eq(encode_paths(&record.documents)?),
            social_help_records::description.eq(&record.description),
            social_help_records::created_by.eq(created_by),
        ))
        .execute(conn)?;

    let record_id: i64 = get_last_insert_rowid(conn)?;
    info!(record_id, repatriant_id, "Created social help record");
    Ok(record_id)
}

/// Updates an active social help record and returns its repatriant ID.
///
/// # Errors
///
/// Returns `NotFound` if there is no active record with the ID.
pub fn update_social_help_record(
    conn: &mut SqliteConnection,
    record_id: i64,
    changes: &SocialHelpRecordChanges,
) -> Result<i64, PersistenceError> {
    let repatriant_id: i64 = active_owner!(conn, social_help_records, record_id)?;
    if *changes == SocialHelpRecordChanges::default() {
        return Ok(repatriant_id);
    }

    let documents: Option<String> = match &changes.documents {
        Some(paths) => Some(serde_json::to_string(paths)?),
        None => None,
    };

    diesel::update(social_help_records::table)
        .filter(social_help_records::record_id.eq(record_id))
        .set(SocialHelpRecordChangeset {
            help_type: changes.help_type.clone(),
            custom_help_type: changes.custom_help_type.clone(),
            responsible: changes.responsible.clone(),
            help_date: changes.help_date.clone(),
            amount: changes.amount.clone(),
            documents,
            description: changes.description.clone(),
        })
        .execute(conn)?;

    info!(record_id, "Updated social help record");
    Ok(repatriant_id)
}

/// Creates an event record.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist, or an error if the
/// insert fails.
pub fn create_event_record(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    record: &NewEventRecord,
    created_by: i64,
) -> Result<i64, PersistenceError> {
    require_repatriant(conn, repatriant_id)?;

    diesel::insert_into(event_records::table)
        .values((
            event_records::repatriant_id.eq(repatriant_id),
            event_records::created_by.eq(created_by),
            record,
        ))
        .execute(conn)?;

    let record_id: i64 = get_last_insert_rowid(conn)?;
    info!(record_id, repatriant_id, "Created event record");
    Ok(record_id)
}

/// Updates an active event record and returns its repatriant ID.
///
/// # Errors
///
/// Returns `NotFound` if there is no active record with the ID.
pub fn update_event_record(
    conn: &mut SqliteConnection,
    record_id: i64,
    changes: &EventRecordChanges,
) -> Result<i64, PersistenceError> {
    let repatriant_id: i64 = active_owner!(conn, event_records, record_id)?;
    if *changes == EventRecordChanges::default() {
        return Ok(repatriant_id);
    }

    diesel::update(event_records::table)
        .filter(event_records::record_id.eq(record_id))
        .set(changes)
        .execute(conn)?;

    info!(record_id, "Updated event record");
    Ok(repatriant_id)
}

/// Creates an other record.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist, or an error if the
/// insert fails.
pub fn create_other_record(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    record: &NewOtherRecord,
    created_by: i64,
) -> Result<i64, PersistenceError> {
    require_repatriant(conn, repatriant_id)?;

    diesel::insert_into(other_records::table)
        .values((
            other_records::repatriant_id.eq(repatriant_id),
            other_records::created_by.eq(created_by),
            record,
        ))
        .execute(conn)?;

    let record_id: i64 = get_last_insert_rowid(conn)?;
    info!(record_id, repatriant_id, "Created other record");
    Ok(record_id)
}

/// Updates an active other record and returns its repatriant ID.
///
/// # Errors
///
/// Returns `NotFound` if there is no active record with the ID.
pub fn update_other_record(
    conn: &mut SqliteConnection,
    record_id: i64,
    changes: &OtherRecordChanges,
) -> Result<i64, PersistenceError> {
    let repatriant_id: i64 = active_owner!(conn, other_records, record_id)?;
    if *changes == OtherRecordChanges::default() {
        return Ok(repatriant_id);
    }

    diesel::update(other_records::table)
        .filter(other_records::record_id.eq(record_id))
        .set(changes)
        .execute(conn)?;

    info!(record_id, "Updated other record");
    Ok(repatriant_id)
}

soft_delete_lifecycle!(housing_records, housing_record);
soft_delete_lifecycle!(social_help_records, social_help_record);
soft_delete_lifecycle!(event_records, event_record);
soft_delete_lifecycle!(other_records, other_record);
