// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod dates;
mod error;
mod family;
mod queue;
mod role;
mod search;
mod status;
mod text;

#[cfg(test)]
mod tests;

pub use dates::{
    format_date, format_time_of_day, format_timestamp, parse_amount, parse_date,
    parse_optional_date, parse_timestamp,
};
pub use error::DomainError;
pub use family::{
    CHILD_RELATIONSHIPS, DependentKind, MIN_BIRTH_YEAR, classify_relationship,
    extract_birth_year, is_minor_birth_year,
};
pub use queue::{
    CHILDREN_BONUS, LAW_VIOLATION_PENALTY, QueueCandidate, QueueFactors, QueueStanding,
    WORK_BONUS, days_in_queue, queue_score, rank_queue,
};
pub use role::Role;
pub use search::{
    AddressPart, DateRange, HousingCriteria, NAME_FIELDS, SEARCH_PAGE_SIZE, SearchCriteria,
    SearchMode, TextField, WordMatcher, matches_word, page_count, split_part, word_pattern,
};
pub use status::{STATUS_VALIDITY_DAYS, StatusCheck, check_status, status_expiry};
pub use text::{
    OTHER_NATIONALITY, non_blank, normalize_nationality, normalize_text, resolve_nationality,
    to_upper,
};
