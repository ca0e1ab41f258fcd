// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Housing department record mutations.
//!
//! The received-housing rule is applied here on both create and update:
//! without received housing there is no acquisition status and no address.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{DependentInput, HousingDepartmentInput, HousingDocument};
use crate::diesel_schema::housing_department_records;
use crate::error::PersistenceError;
use crate::mutations::repatriants::replace_dependents;
use crate::queries::repatriants::repatriant_exists;

fn encode_documents(documents: &[HousingDocument]) -> Result<Option<String>, PersistenceError> {
    if documents.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(documents)?))
    }
}

/// Creates a housing department record and, when given, replaces the
/// repatriant's dependents with the submitted family composition.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist, or an error if a
/// write fails; nothing is written in either case.
pub fn create_housing_department_record(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    input: HousingDepartmentInput,
    created_by: i64,
    family: Option<&[DependentInput]>,
) -> Result<i64, PersistenceError> {
    let input: HousingDepartmentInput = input.with_received_housing_rule();

    conn.transaction::<_, PersistenceError, _>(|conn| {
        if !repatriant_exists(conn, repatriant_id)? {
            return Err(PersistenceError::NotFound(format!(
                "Repatriant {repatriant_id} not found"
            )));
        }

        let documents: Option<String> =
            encode_documents(input.documents.as_deref().unwrap_or_default())?;

        diesel::insert_into(housing_department_records::table)
            .values((
                housing_department_records::repatriant_id.eq(repatriant_id),
                housing_department_records::category.eq(&input.category),
                housing_department_records::received_housing.eq(input.received_housing),
                housing_department_records::housing_type.eq(&input.housing_type),
                housing_department_records::housing_acquisition.eq(&input.housing_acquisition),
                housing_department_records::address.eq(&input.address),
                housing_department_records::has_warrant.eq(input.has_warrant),
                housing_department_records::repair_amount.eq(input.repair_amount),
                housing_department_records::documents.eq(documents),
                housing_department_records::notes.eq(&input.notes),
                housing_department_records::protocol_number.eq(&input.protocol_number),
                housing_department_records::created_by.eq(created_by),
            ))
            .execute(conn)?;

        let record_id: i64 = get_last_insert_rowid(conn)?;

        if let Some(family) = family {
            replace_dependents(conn, repatriant_id, family)?;
        }

        info!(record_id, repatriant_id, "Created housing department record");
        Ok(record_id)
    })
}

/// Rewrites an active housing department record and returns its repatriant
/// ID. Documents are only replaced when `input.documents` is set.
///
/// # Errors
///
/// Returns `NotFound` if there is no active record with the ID, or an error
/// if a write fails; nothing is written in either case.
pub fn update_housing_department_record(
    conn: &mut SqliteConnection,
    record_id: i64,
    input: HousingDepartmentInput,
    family: Option<&[DependentInput]>,
) -> Result<i64, PersistenceError> {
    let input: HousingDepartmentInput = input.with_received_housing_rule();

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let repatriant_id: i64 = match housing_department_records::table
            .filter(housing_department_records::record_id.eq(record_id))
            .filter(housing_department_records::is_deleted.eq(false))
            .select(housing_department_records::repatriant_id)
            .first(conn)
        {
            Ok(id) => id,
            Err(diesel::result::Error::NotFound) => {
                return Err(PersistenceError::NotFound(format!(
                    "Housing department record {record_id} not found"
                )));
            }
            Err(e) => return Err(PersistenceError::from(e)),
        };

        diesel::update(housing_department_records::table)
            .filter(housing_department_records::record_id.eq(record_id))
            .set((
                housing_department_records::category.eq(&input.category),
                housing_department_records::received_housing.eq(input.received_housing),
                housing_department_records::housing_type.eq(&input.housing_type),
                housing_department_records::housing_acquisition.eq(&input.housing_acquisition),
                housing_department_records::address.eq(&input.address),
                housing_department_records::has_warrant.eq(input.has_warrant),
                housing_department_records::repair_amount.eq(input.repair_amount),
                housing_department_records::notes.eq(&input.notes),
                housing_department_records::protocol_number.eq(&input.protocol_number),
            ))
            .execute(conn)?;

        if let Some(documents) = &input.documents {
            diesel::update(housing_department_records::table)
                .filter(housing_department_records::record_id.eq(record_id))
                .set(housing_department_records::documents.eq(encode_documents(documents)?))
                .execute(conn)?;
        }

        if let Some(family) = family {
            replace_dependents(conn, repatriant_id, family)?;
        }

        info!(record_id, "Updated housing department record");
        Ok(repatriant_id)
    })
}

soft_delete_lifecycle!(housing_department_records, housing_department_record);
