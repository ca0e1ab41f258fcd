// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repatriant search criteria.
//!
//! Criteria are typed here and turned into SQL by the persistence layer.
//! Only non-empty fields produce conditions; the conditions are combined
//! with AND.

use regex::Regex;
use time::Date;

use crate::role::Role;

/// Rows per search results page.
pub const SEARCH_PAGE_SIZE: i64 = 20;

/// Free-text repatriant columns matched on word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Surname,
    GivenName,
    Patronymic,
    BirthSurname,
    CountryOfResidence,
    ArrivedFrom,
    Nationality,
    IdentityDocument,
    IdentityDocumentNumber,
    Phone,
    Email,
    Address,
    Birthplace,
    AdditionalInfo,
}

/// The four name columns that the quick query searches.
pub const NAME_FIELDS: [TextField; 4] = [
    TextField::Surname,
    TextField::GivenName,
    TextField::Patronymic,
    TextField::BirthSurname,
];

/// An inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl DateRange {
    #[must_use]
    pub const fn new(from: Option<Date>, to: Option<Date>) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Parts of a housing address written as `city, street, house, apartment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressPart {
    City,
    Street,
    House,
    Apartment,
}

impl AddressPart {
    /// The separator between address parts.
    pub const SEPARATOR: &'static str = ", ";

    /// 1-based position of the part within the address.
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            Self::City => 1,
            Self::Street => 2,
            Self::House => 3,
            Self::Apartment => 4,
        }
    }
}

/// Returns the 1-based `index`-th part of `value` split on `delimiter`.
#[must_use]
pub fn split_part(value: &str, delimiter: &str, index: i32) -> Option<String> {
    let position: usize = usize::try_from(index).ok()?.checked_sub(1)?;
    if delimiter.is_empty() {
        return (position == 0).then(|| value.to_string());
    }
    value.split(delimiter).nth(position).map(str::to_string)
}

/// Filters over the housing department records of a repatriant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HousingCriteria {
    pub category: Option<String>,
    pub protocol_number: Option<String>,
    pub notes: Option<String>,
    pub received_housing: Option<bool>,
    pub has_warrant: Option<bool>,
    pub housing_status: Option<String>,
    pub address: Vec<(AddressPart, String)>,
    pub repair_amount: Option<f64>,
    pub created: DateRange,
}

impl HousingCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.protocol_number.is_none()
            && self.notes.is_none()
            && self.received_housing.is_none()
            && self.has_warrant.is_none()
            && self.housing_status.is_none()
            && self.address.is_empty()
            && self.repair_amount.is_none()
            && self.created.is_empty()
    }
}

/// The advanced search form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchCriteria {
    pub text: Vec<(TextField, String)>,
    pub file_code: Option<String>,
    pub sex: Option<String>,
    pub family_status: Option<String>,
    pub birth_date: DateRange,
    pub status_date: DateRange,
    pub children_count: Option<u32>,
    pub housing: HousingCriteria,
}

impl SearchCriteria {
    /// Drops criteria the role may not use.
    ///
    /// Housing filters are only honoured for housing staff and admins.
    #[must_use]
    pub fn for_role(mut self, role: Role) -> Self {
        if !role.can_view_housing() {
            self.housing = HousingCriteria::default();
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.file_code.is_none()
            && self.sex.is_none()
            && self.family_status.is_none()
            && self.birth_date.is_empty()
            && self.status_date.is_empty()
            && self.children_count.is_none()
            && self.housing.is_empty()
    }
}

/// How a search request is executed.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    /// No filters and no query: list everything.
    All,
    /// Every word must match one of the name columns.
    Quick(Vec<String>),
    /// Conjunction of the advanced criteria.
    Advanced(SearchCriteria),
}

impl SearchMode {
    /// Chooses the mode. Advanced criteria take precedence over the quick
    /// query.
    #[must_use]
    pub fn select(criteria: SearchCriteria, query: &str) -> Self {
        if !criteria.is_empty() {
            return Self::Advanced(criteria);
        }

        let words: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            Self::All
        } else {
            Self::Quick(words)
        }
    }
}

/// Builds the case-insensitive word-boundary pattern for a literal needle.
#[must_use]
pub fn word_pattern(needle: &str) -> String {
    format!(r"(?i)\b{}\b", regex::escape(needle.trim()))
}

/// Word-boundary matcher that keeps the last compiled pattern.
///
/// A search evaluates the same needle against every row, so the cache
/// almost always hits.
#[derive(Debug, Default)]
pub struct WordMatcher {
    cached: Option<(String, Regex)>,
}

impl WordMatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self { cached: None }
    }

    /// Whether `needle` occurs in `haystack` as a whole word, ignoring case.
    /// A blank needle never matches.
    pub fn matches(&mut self, haystack: &str, needle: &str) -> bool {
        if needle.trim().is_empty() {
            return false;
        }

        let stale: bool = self.cached.as_ref().is_none_or(|(cached, _)| cached != needle);
        if stale {
            match Regex::new(&word_pattern(needle)) {
                Ok(regex) => self.cached = Some((needle.to_string(), regex)),
                Err(_) => return false,
            }
        }

        self.cached
            .as_ref()
            .is_some_and(|(_, regex)| regex.is_match(haystack))
    }
}

/// One-shot word match.
#[must_use]
pub fn matches_word(haystack: &str, needle: &str) -> bool {
    WordMatcher::new().matches(haystack, needle)
}

/// Number of pages needed for `total` rows.
#[must_use]
pub const fn page_count(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        0
    } else {
        (total + page_size - 1) / page_size
    }
}
