// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repatriant and dependent queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{
    ChildData, Family, FamilyMemberData, RepatriantData, RepatriantSummary, join_name,
};
use crate::diesel_schema::{children, family_members, repatriants};
use crate::error::PersistenceError;
use crate::sql_functions::ifnull;

/// Maximum rows returned by [`lookup_repatriants`].
pub const LOOKUP_LIMIT: i64 = 20;

/// `(id, file_code, surname, given_name, patronymic)`
type SummaryRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// `(id, surname, given_name, patronymic)`
type NameRow = (i64, Option<String>, Option<String>, Option<String>);

/// Retrieves a repatriant by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the repatriant is not found.
pub fn get_repatriant(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
) -> Result<Option<RepatriantData>, PersistenceError> {
    debug!(repatriant_id, "Looking up repatriant");

    let result: Result<RepatriantData, diesel::result::Error> = repatriants::table
        .filter(repatriants::repatriant_id.eq(repatriant_id))
        .select(RepatriantData::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Whether a repatriant with the ID exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn repatriant_exists(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = repatriants::table
        .filter(repatriants::repatriant_id.eq(repatriant_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// The ID the next registered repatriant receives: one past the current
/// maximum, or 1 for an empty registry.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn next_repatriant_id(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    let max_id: Option<i64> = repatriants::table
        .select(diesel::dsl::max(repatriants::repatriant_id))
        .first(conn)?;
    Ok(max_id.unwrap_or(0) + 1)
}

/// Loads the children and adult family members of a repatriant.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_family(
    conn: &mut SqliteConnection,
    repatriant_id: i64,
) -> Result<Family, PersistenceError> {
    let children: Vec<ChildData> = children::table
        .filter(children::repatriant_id.eq(repatriant_id))
        .order(children::child_id.asc())
        .select(ChildData::as_select())
        .load(conn)?;

    let family_members: Vec<FamilyMemberData> = family_members::table
        .filter(family_members::repatriant_id.eq(repatriant_id))
        .order(family_members::member_id.asc())
        .select(FamilyMemberData::as_select())
        .load(conn)?;

    debug!(
        repatriant_id,
        children = children.len(),
        family_members = family_members.len(),
        "Loaded family"
    );

    Ok(Family {
        children,
        family_members,
    })
}

/// Counts all repatriants.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_repatriants(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(repatriants::table.count().get_result(conn)?)
}

/// Counts repatriants registered on the given `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_registered_on(
    conn: &mut SqliteConnection,
    date: &str,
) -> Result<i64, PersistenceError> {
    Ok(repatriants::table
        .filter(repatriants::registered_on.eq(date))
        .count()
        .get_result(conn)?)
}

/// Picker lookup: the query, uppercased, must occur as one phrase in
/// `surname given_name patronymic` or in the file code.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn lookup_repatriants(
    conn: &mut SqliteConnection,
    query: &str,
) -> Result<Vec<RepatriantSummary>, PersistenceError> {
    let pattern: String = format!("%{}%", escape_like(&query.trim().to_uppercase()));

    let full_name = ifnull(repatriants::surname, "")
        .concat(" ")
        .concat(ifnull(repatriants::given_name, ""))
        .concat(" ")
        .concat(ifnull(repatriants::patronymic, ""));

    let statement = repatriants::table
        .select((
            repatriants::repatriant_id,
            repatriants::file_code,
            repatriants::surname,
            repatriants::given_name,
            repatriants::patronymic,
        ))
        .filter(
            repatriants::file_code
                .like(pattern.clone())
                .escape('\\')
                .or(full_name.like(pattern).escape('\\').nullable()),
        );

    let rows: Vec<SummaryRow> = statement
        .order(repatriants::repatriant_id.desc())
        .limit(LOOKUP_LIMIT)
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(
            |(repatriant_id, file_code, surname, given_name, patronymic)| RepatriantSummary {
                repatriant_id,
                file_code,
                full_name: join_name(&[
                    surname.as_deref(),
                    given_name.as_deref(),
                    patronymic.as_deref(),
                ]),
            },
        )
        .collect())
}

/// Escapes the `LIKE` wildcards of a literal.
fn escape_like(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Names of the given repatriants keyed by ID, for views that only hold IDs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn full_names(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<std::collections::HashMap<i64, String>, PersistenceError> {
    let rows: Vec<NameRow> = repatriants::table
        .filter(repatriants::repatriant_id.eq_any(ids))
        .select((
            repatriants::repatriant_id,
            repatriants::surname,
            repatriants::given_name,
            repatriants::patronymic,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(id, surname, given_name, patronymic)| {
            (
                id,
                join_name(&[
                    surname.as_deref(),
                    given_name.as_deref(),
                    patronymic.as_deref(),
                ]),
            )
        })
        .collect())
}

/// Every repatriant, newest first. Used by the exports.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_all_repatriants(
    conn: &mut SqliteConnection,
) -> Result<Vec<RepatriantData>, PersistenceError> {
    Ok(repatriants::table
        .order(repatriants::repatriant_id.desc())
        .select(RepatriantData::as_select())
        .load(conn)?)
}

/// Every child row of the registry.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_all_children(conn: &mut SqliteConnection) -> Result<Vec<ChildData>, PersistenceError> {
    Ok(children::table
        .order((children::repatriant_id.asc(), children::child_id.asc()))
        .select(ChildData::as_select())
        .load(conn)?)
}

/// Every adult family member row of the registry.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_all_family_members(
    conn: &mut SqliteConnection,
) -> Result<Vec<FamilyMemberData>, PersistenceError> {
    Ok(family_members::table
        .order((
            family_members::repatriant_id.asc(),
            family_members::member_id.asc(),
        ))
        .select(FamilyMemberData::as_select())
        .load(conn)?)
}
