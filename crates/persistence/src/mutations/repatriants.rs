// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repatriant mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use repatria_domain::DependentKind;
use tracing::{debug, info};

use crate::data_models::{DependentInput, RepatriantChanges, RepatriantFields};
use crate::diesel_schema::{children, family_members, repatriants};
use crate::error::PersistenceError;
use crate::queries::repatriants::{next_repatriant_id, repatriant_exists};

/// Registers a repatriant together with its dependents.
///
/// The ID is one past the current maximum.
///
/// # Errors
///
/// Returns an error if any insert fails; nothing is written in that case.
pub fn register_repatriant(
    conn: &mut SqliteConnection,
    fields: &RepatriantFields,
    dependents: &[DependentInput],
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let repatriant_id: i64 = next_repatriant_id(conn)?;

        diesel::insert_into(repatriants::table)
            .values((repatriants::repatriant_id.eq(repatriant_id), fields))
            .execute(conn)?;

        insert_dependents(conn, repatriant_id, dependents)?;

        info!(
            repatriant_id,
            dependents = dependents.len(),
            "Registered repatriant"
        );
        Ok(repatriant_id)
    })
}

/// Applies a partial update and, when given, replaces the dependents.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist, or an error if a
/// write fails; nothing is written in either case.
pub fn update_repatriant(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    changes: &RepatriantChanges,
    dependents: Option<&[DependentInput]>,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        if !repatriant_exists(conn, repatriant_id)? {
            return Err(PersistenceError::NotFound(format!(
                "Repatriant {repatriant_id} not found"
            )));
        }

        if !changes.is_empty() {
            diesel::update(repatriants::table)
                .filter(repatriants::repatriant_id.eq(repatriant_id))
                .set(changes)
                .execute(conn)?;
        }

        if let Some(dependents) = dependents {
            replace_dependents_in(conn, repatriant_id, dependents)?;
        }

        info!(repatriant_id, "Updated repatriant");
        Ok(())
    })
}

/// Replaces every child and family member of a repatriant.
///
/// # Errors
///
/// Returns an error if a write fails; nothing is written in that case.
pub fn replace_dependents(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    dependents: &[DependentInput],
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        replace_dependents_in(conn, repatriant_id, dependents)
    })
}

fn replace_dependents_in(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    dependents: &[DependentInput],
) -> Result<(), PersistenceError> {
    diesel::delete(children::table.filter(children::repatriant_id.eq(repatriant_id)))
        .execute(conn)?;
    diesel::delete(family_members::table.filter(family_members::repatriant_id.eq(repatriant_id)))
        .execute(conn)?;
    insert_dependents(conn, repatriant_id, dependents)
}

fn insert_dependents(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
    dependents: &[DependentInput],
) -> Result<(), PersistenceError> {
    for dependent in dependents {
        match dependent.kind() {
            DependentKind::Child => {
                diesel::insert_into(children::table)
                    .values((
                        children::repatriant_id.eq(repatriant_id),
                        children::relationship.eq(&dependent.relationship),
                        children::full_name.eq(&dependent.full_name),
                        children::birth_year.eq(&dependent.birth_year),
                        children::birthplace.eq(&dependent.birthplace),
                        children::citizenship.eq(&dependent.citizenship),
                        children::nationality.eq(&dependent.nationality),
                        children::lives_with_parent.eq(dependent.lives_with_parent),
                    ))
                    .execute(conn)?;
            }
            DependentKind::FamilyMember => {
                let birth_year: Option<i32> = dependent
                    .birth_year
                    .as_deref()
                    .and_then(|year| year.trim().parse().ok());

                diesel::insert_into(family_members::table)
                    .values((
                        family_members::repatriant_id.eq(repatriant_id),
                        family_members::relationship.eq(&dependent.relationship),
                        family_members::full_name.eq(&dependent.full_name),
                        family_members::birth_year.eq(birth_year),
                        family_members::citizenship.eq(&dependent.citizenship),
                        family_members::nationality.eq(&dependent.nationality),
                        family_members::address.eq(&dependent.address),
                        family_members::lives_with_parent.eq(dependent.lives_with_parent),
                    ))
                    .execute(conn)?;
            }
        }
    }

    debug!(repatriant_id, count = dependents.len(), "Inserted dependents");
    Ok(())
}

/// Deletes a repatriant. Dependents, case notes, housing department records
/// and queue entries go with it through the foreign key cascades; the audit
/// trail is kept.
///
/// # Errors
///
/// Returns `NotFound` if the repatriant does not exist.
pub fn delete_repatriant(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(repatriants::table)
        .filter(repatriants::repatriant_id.eq(repatriant_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Repatriant {repatriant_id} not found"
        )));
    }

    info!(repatriant_id, "Deleted repatriant");
    Ok(())
}
