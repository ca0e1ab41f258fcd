// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Aggregations behind the admin reports.

use std::collections::HashMap;

use diesel::SqliteConnection;
use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use serde::Serialize;

use crate::data_models::{CountRow, RepatriantSummary, join_name};
use crate::diesel_schema::{
    action_log, children, event_records, family_members, housing_records, other_records,
    repatriants, social_help_records,
};
use crate::error::PersistenceError;

/// Number of rows in the "top" origin and nationality lists.
pub const TOP_LIMIT: i64 = 10;

/// Repatriants with at least this many children count as large families.
pub const LARGE_FAMILY_CHILDREN: i64 = 3;

/// `(id, file_code, surname, given_name, patronymic)`
type SummaryRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Label used for rows where the grouped column is empty.
const UNSPECIFIED: &str = "НЕ УКАЗАНО";

/// Non-deleted case-note counts per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CaseNoteCounts {
    pub housing_records: i64,
    pub social_help_records: i64,
    pub event_records: i64,
    pub other_records: i64,
}

/// Audit activity of one username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserActivity {
    pub username: String,
    pub actions: i64,
    pub last_action_on: String,
    pub last_action_at: String,
}

fn into_count_rows(rows: Vec<(Option<String>, i64)>) -> Vec<CountRow> {
    rows.into_iter()
        .map(|(value, count)| CountRow {
            value: value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNSPECIFIED.to_string()),
            count,
        })
        .collect()
}

/// Counts of active case notes per kind.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn case_note_counts(conn: &mut SqliteConnection) -> Result<CaseNoteCounts, PersistenceError> {
    Ok(CaseNoteCounts {
        housing_records: housing_records::table
            .filter(housing_records::is_deleted.eq(false))
            .count()
            .get_result(conn)?,
        social_help_records: social_help_records::table
            .filter(social_help_records::is_deleted.eq(false))
            .count()
            .get_result(conn)?,
        event_records: event_records::table
            .filter(event_records::is_deleted.eq(false))
            .count()
            .get_result(conn)?,
        other_records: other_records::table
            .filter(other_records::is_deleted.eq(false))
            .count()
            .get_result(conn)?,
    })
}

/// Repatriants per sex.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn repatriants_by_sex(conn: &mut SqliteConnection) -> Result<Vec<CountRow>, PersistenceError> {
    let rows: Vec<(Option<String>, i64)> = repatriants::table
        .group_by(repatriants::sex)
        .select((repatriants::sex, count_star()))
        .order(count_star().desc())
        .load(conn)?;
    Ok(into_count_rows(rows))
}

/// Repatriants per family status.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn repatriants_by_family_status(
    conn: &mut SqliteConnection,
) -> Result<Vec<CountRow>, PersistenceError> {
    let rows: Vec<(Option<String>, i64)> = repatriants::table
        .group_by(repatriants::family_status)
        .select((repatriants::family_status, count_star()))
        .order(count_star().desc())
        .load(conn)?;
    Ok(into_count_rows(rows))
}

/// The most common places repatriants arrived from.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn top_origins(conn: &mut SqliteConnection) -> Result<Vec<CountRow>, PersistenceError> {
    let rows: Vec<(Option<String>, i64)> = repatriants::table
        .filter(repatriants::arrived_from.is_not_null())
        .group_by(repatriants::arrived_from)
        .select((repatriants::arrived_from, count_star()))
        .order(count_star().desc())
        .limit(TOP_LIMIT)
        .load(conn)?;
    Ok(into_count_rows(rows))
}

/// The most common nationalities.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn top_nationalities(conn: &mut SqliteConnection) -> Result<Vec<CountRow>, PersistenceError> {
    let rows: Vec<(Option<String>, i64)> = repatriants::table
        .filter(repatriants::nationality.is_not_null())
        .group_by(repatriants::nationality)
        .select((repatriants::nationality, count_star()))
        .order(count_star().desc())
        .limit(TOP_LIMIT)
        .load(conn)?;
    Ok(into_count_rows(rows))
}

/// Active social help records per help type.
///
/// The custom type wins over the generic one when it is filled in.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn help_type_counts(conn: &mut SqliteConnection) -> Result<Vec<CountRow>, PersistenceError> {
    let rows: Vec<(String, Option<String>)> = social_help_records::table
        .filter(social_help_records::is_deleted.eq(false))
        .select((
            social_help_records::help_type,
            social_help_records::custom_help_type,
        ))
        .load(conn)?;

    let mut counts: HashMap<String, i64> = HashMap::new();
    for (help_type, custom_help_type) in rows {
        let label: String = custom_help_type
            .filter(|custom| !custom.trim().is_empty())
            .unwrap_or(help_type);
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut result: Vec<CountRow> = counts
        .into_iter()
        .map(|(value, count)| CountRow { value, count })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    Ok(result)
}

/// Active event records per event type.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn event_type_counts(conn: &mut SqliteConnection) -> Result<Vec<CountRow>, PersistenceError> {
    let rows: Vec<(Option<String>, i64)> = event_records::table
        .filter(event_records::is_deleted.eq(false))
        .group_by(event_records::event_type)
        .select((event_records::event_type, count_star()))
        .order(count_star().desc())
        .load(conn)?;
    Ok(into_count_rows(rows))
}

/// Number of logged actions per username, most active first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn user_activity(conn: &mut SqliteConnection) -> Result<Vec<UserActivity>, PersistenceError> {
    let totals: Vec<(String, i64, Option<i64>)> = action_log::table
        .group_by(action_log::username)
        .select((action_log::username, count_star(), max(action_log::log_id)))
        .order(count_star().desc())
        .load(conn)?;

    let last_ids: Vec<i64> = totals.iter().filter_map(|(_, _, id)| *id).collect();
    let last_entries: HashMap<i64, (String, String)> = action_log::table
        .filter(action_log::log_id.eq_any(&last_ids))
        .select((action_log::log_id, action_log::logged_on, action_log::logged_at))
        .load::<(i64, String, String)>(conn)?
        .into_iter()
        .map(|(id, on, at)| (id, (on, at)))
        .collect();

    Ok(totals
        .into_iter()
        .map(|(username, actions, last_id)| {
            let (last_action_on, last_action_at) = last_id
                .and_then(|id| last_entries.get(&id).cloned())
                .unwrap_or_default();
            UserActivity {
                username,
                actions,
                last_action_on,
                last_action_at,
            }
        })
        .collect())
}

/// Repatriants with at least [`LARGE_FAMILY_CHILDREN`] children, with their
/// child count.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn large_families(
    conn: &mut SqliteConnection,
) -> Result<Vec<(RepatriantSummary, i64)>, PersistenceError> {
    let counts: Vec<(i64, i64)> = children::table
        .group_by(children::repatriant_id)
        .select((children::repatriant_id, count_star()))
        .having(count_star().ge(LARGE_FAMILY_CHILDREN))
        .order(count_star().desc())
        .load(conn)?;

    let ids: Vec<i64> = counts.iter().map(|(id, _)| *id).collect();
    let summaries: HashMap<i64, RepatriantSummary> = summaries_for(conn, &ids)?;

    Ok(counts
        .into_iter()
        .filter_map(|(id, count)| summaries.get(&id).cloned().map(|s| (s, count)))
        .collect())
}

/// Repatriants without any child or family member rows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn repatriants_without_dependents(
    conn: &mut SqliteConnection,
) -> Result<Vec<RepatriantSummary>, PersistenceError> {
    let ids: Vec<i64> = repatriants::table
        .filter(repatriants::repatriant_id.ne_all(children::table.select(children::repatriant_id)))
        .filter(
            repatriants::repatriant_id
                .ne_all(family_members::table.select(family_members::repatriant_id)),
        )
        .order(repatriants::repatriant_id.desc())
        .select(repatriants::repatriant_id)
        .load(conn)?;

    let summaries: HashMap<i64, RepatriantSummary> = summaries_for(conn, &ids)?;
    Ok(ids
        .into_iter()
        .filter_map(|id| summaries.get(&id).cloned())
        .collect())
}

fn summaries_for(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<HashMap<i64, RepatriantSummary>, PersistenceError> {
    let rows: Vec<SummaryRow> = repatriants::table
        .filter(repatriants::repatriant_id.eq_any(ids))
        .select((
            repatriants::repatriant_id,
            repatriants::file_code,
            repatriants::surname,
            repatriants::given_name,
            repatriants::patronymic,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(repatriant_id, file_code, surname, given_name, patronymic)| {
            (
                repatriant_id,
                RepatriantSummary {
                    repatriant_id,
                    file_code,
                    full_name: join_name(&[
                        surname.as_deref(),
                        given_name.as_deref(),
                        patronymic.as_deref(),
                    ]),
                },
            )
        })
        .collect())
}
