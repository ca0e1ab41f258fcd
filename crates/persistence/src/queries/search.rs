// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repatriant search.
//!
//! Every non-empty criterion becomes one boxed boolean condition over the
//! `repatriants` table and the conditions are joined with `AND`. Criteria
//! that depend on other tables (minor children, housing department records)
//! become `IN` subqueries evaluated by `SQLite`.
//!
//! The count and page queries each need their own condition tree because
//! boxed expressions are consumed by `filter`, so the tree is built twice.

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;
use repatria_domain::{
    AddressPart, DateRange, HousingCriteria, NAME_FIELDS, Role, SEARCH_PAGE_SIZE,
    SearchCriteria, SearchMode, TextField, format_date, page_count, to_upper,
};
use tracing::debug;

use crate::data_models::{RepatriantData, SearchPage};
use crate::diesel_schema::{children, housing_department_records, repatriants};
use crate::error::PersistenceError;
use crate::sql_functions::{is_minor_birth_year, split_part, word_match};

type Condition = Box<dyn BoxableExpression<repatriants::table, Sqlite, SqlType = Bool>>;

/// Runs a search and returns one page of results.
///
/// Pages are 1-based; page 0 is treated as page 1 and a page past the end is
/// empty. `current_year` anchors the minor-children age window.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub fn search_repatriants(
    conn: &mut SqliteConnection,
    mode: &SearchMode,
    role: Role,
    page: i64,
    current_year: i32,
) -> Result<SearchPage, PersistenceError> {
    let mut count_query = repatriants::table.into_boxed();
    if let Some(condition) = build_condition(mode, current_year) {
        count_query = count_query.filter(condition);
    }
    let total: i64 = count_query.count().get_result(conn)?;

    let page: i64 = page.max(1);
    let mut page_query = repatriants::table
        .select(RepatriantData::as_select())
        .into_boxed();
    if let Some(condition) = build_condition(mode, current_year) {
        page_query = page_query.filter(condition);
    }

    page_query = if role.orders_by_status_first() {
        page_query.order((
            repatriants::status_granted_on.is_null().asc(),
            repatriants::repatriant_id.desc(),
        ))
    } else {
        page_query.order(repatriants::repatriant_id.desc())
    };

    let rows: Vec<RepatriantData> = page_query
        .limit(SEARCH_PAGE_SIZE)
        .offset((page - 1).saturating_mul(SEARCH_PAGE_SIZE))
        .load(conn)?;

    debug!(total, page, returned = rows.len(), "Search completed");

    Ok(SearchPage {
        rows,
        page,
        total,
        pages: page_count(total, SEARCH_PAGE_SIZE),
    })
}

/// Repatriants whose number of minor children equals `target`.
///
/// Only repatriants with at least one qualifying child row are grouped, so
/// a target of zero matches nobody.
fn minor_count_condition(target: u32, current_year: i32) -> Condition {
    let minors = children::table
        .filter(is_minor_birth_year(children::birth_year, current_year))
        .group_by(children::repatriant_id)
        .having(count_star().eq(i64::from(target)))
        .select(children::repatriant_id);

    Box::new(repatriants::repatriant_id.eq_any(minors))
}

/// Repatriants with at least one non-deleted housing department record
/// matching every housing criterion.
fn housing_condition(criteria: &HousingCriteria) -> Condition {
    let mut statement = housing_department_records::table
        .filter(housing_department_records::is_deleted.eq(false))
        .select(housing_department_records::repatriant_id)
        .into_boxed();

    if let Some(category) = &criteria.category {
        statement = statement.filter(word_match(
            housing_department_records::category,
            category.trim().to_string(),
        ));
    }
    if let Some(protocol_number) = &criteria.protocol_number {
        statement = statement.filter(word_match(
            housing_department_records::protocol_number,
            protocol_number.trim().to_string(),
        ));
    }
    if let Some(notes) = &criteria.notes {
        statement = statement.filter(word_match(
            housing_department_records::notes,
            notes.trim().to_string(),
        ));
    }
    if let Some(received_housing) = criteria.received_housing {
        statement =
            statement.filter(housing_department_records::received_housing.eq(received_housing));
    }
    if let Some(has_warrant) = criteria.has_warrant {
        statement = statement.filter(housing_department_records::has_warrant.eq(has_warrant));
    }
    if let Some(status) = &criteria.housing_status {
        statement =
            statement.filter(housing_department_records::housing_acquisition.eq(to_upper(status)));
    }
    for (part, needle) in &criteria.address {
        statement = statement.filter(word_match(
            split_part(
                housing_department_records::address,
                AddressPart::SEPARATOR,
                part.index(),
            ),
            needle.trim().to_string(),
        ));
    }
    if let Some(repair_amount) = criteria.repair_amount {
        statement = statement.filter(housing_department_records::repair_amount.eq(repair_amount));
    }
    if let Some(from) = criteria.created.from {
        statement = statement.filter(housing_department_records::created_at.ge(format_date(from)));
    }
    if let Some(until) = criteria.created.to.and_then(time::Date::next_day) {
        statement = statement.filter(housing_department_records::created_at.lt(format_date(until)));
    }

    Box::new(repatriants::repatriant_id.eq_any(statement))
}

fn build_condition(mode: &SearchMode, current_year: i32) -> Option<Condition> {
    match mode {
        SearchMode::All => None,
        SearchMode::Quick(words) => conjunction(words.iter().filter_map(|word| {
            NAME_FIELDS
                .iter()
                .map(|field| word_condition(*field, word))
                .reduce(|a, b| -> Condition { Box::new(a.or(b)) })
        })),
        SearchMode::Advanced(criteria) => {
            conjunction(advanced_conditions(criteria, current_year))
        }
    }
}

fn advanced_conditions(criteria: &SearchCriteria, current_year: i32) -> Vec<Condition> {
    let mut conditions: Vec<Condition> = criteria
        .text
        .iter()
        .map(|(field, needle)| word_condition(*field, needle))
        .collect();

    if let Some(file_code) = &criteria.file_code {
        conditions.push(Box::new(
            repatriants::file_code
                .eq(to_upper(file_code.trim()))
                .assume_not_null(),
        ));
    }
    if let Some(sex) = &criteria.sex {
        conditions.push(Box::new(
            repatriants::sex.eq(to_upper(sex.trim())).assume_not_null(),
        ));
    }
    if let Some(family_status) = &criteria.family_status {
        conditions.push(Box::new(
            repatriants::family_status
                .eq(to_upper(family_status.trim()))
                .assume_not_null(),
        ));
    }

    push_birth_date_range(&mut conditions, criteria.birth_date);
    push_status_date_range(&mut conditions, criteria.status_date);

    if let Some(target) = criteria.children_count {
        conditions.push(minor_count_condition(target, current_year));
    }
    if !criteria.housing.is_empty() {
        conditions.push(housing_condition(&criteria.housing));
    }

    conditions
}

fn push_birth_date_range(conditions: &mut Vec<Condition>, range: DateRange) {
    if let Some(from) = range.from {
        conditions.push(Box::new(
            repatriants::birth_date.ge(format_date(from)).assume_not_null(),
        ));
    }
    if let Some(to) = range.to {
        conditions.push(Box::new(
            repatriants::birth_date.le(format_date(to)).assume_not_null(),
        ));
    }
}

fn push_status_date_range(conditions: &mut Vec<Condition>, range: DateRange) {
    if let Some(from) = range.from {
        conditions.push(Box::new(
            repatriants::status_granted_on
                .ge(format_date(from))
                .assume_not_null(),
        ));
    }
    if let Some(to) = range.to {
        conditions.push(Box::new(
            repatriants::status_granted_on
                .le(format_date(to))
                .assume_not_null(),
        ));
    }
}

fn conjunction<I>(conditions: I) -> Option<Condition>
where
    I: IntoIterator<Item = Condition>,
{
    conditions
        .into_iter()
        .reduce(|a, b| -> Condition { Box::new(a.and(b)) })
}

fn word_condition(field: TextField, needle: &str) -> Condition {
    let needle: String = needle.trim().to_string();
    match field {
        TextField::Surname => Box::new(word_match(repatriants::surname, needle)),
        TextField::GivenName => Box::new(word_match(repatriants::given_name, needle)),
        TextField::Patronymic => Box::new(word_match(repatriants::patronymic, needle)),
        TextField::BirthSurname => Box::new(word_match(repatriants::birth_surname, needle)),
        TextField::CountryOfResidence => {
            Box::new(word_match(repatriants::country_of_residence, needle))
        }
        TextField::ArrivedFrom => Box::new(word_match(repatriants::arrived_from, needle)),
        TextField::Nationality => Box::new(word_match(repatriants::nationality, needle)),
        TextField::IdentityDocument => {
            Box::new(word_match(repatriants::identity_document, needle))
        }
        TextField::IdentityDocumentNumber => {
            Box::new(word_match(repatriants::identity_document_number, needle))
        }
        TextField::Phone => Box::new(word_match(repatriants::phone, needle)),
        TextField::Email => Box::new(word_match(repatriants::email, needle)),
        TextField::Address => Box::new(word_match(repatriants::address, needle)),
        TextField::Birthplace => Box::new(word_match(repatriants::birthplace, needle)),
        TextField::AdditionalInfo => Box::new(word_match(repatriants::additional_info, needle)),
    }
}
