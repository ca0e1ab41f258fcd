// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dependents of a repatriant.
//!
//! Children and adult family members share a shape and differ only in the
//! relationship value: sons and daughters are children, everything else is
//! an adult family member.

/// Relationship values that classify a dependent as a child.
pub const CHILD_RELATIONSHIPS: [&str; 2] = ["СЫН", "ДОЧЬ"];

/// Earliest birth year accepted from a loosely formatted birth-year string.
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// Oldest age, in calendar years, still counted as a minor.
pub const MINOR_MAX_AGE: i32 = 17;

/// Which table a dependent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentKind {
    Child,
    FamilyMember,
}

/// Classifies a relationship value. Comparison ignores case and surrounding
/// whitespace.
#[must_use]
pub fn classify_relationship(relationship: &str) -> DependentKind {
    let normalized: String = relationship.trim().to_uppercase();
    if CHILD_RELATIONSHIPS.contains(&normalized.as_str()) {
        DependentKind::Child
    } else {
        DependentKind::FamilyMember
    }
}

/// Extracts a four-digit year from a birth-year string such as
/// `"04.05.2001Г."` or `"2015"`.
///
/// All non-digits are dropped and the last four digits are taken. Fewer than
/// four digits, or a year before [`MIN_BIRTH_YEAR`], yields `None`.
#[must_use]
pub fn extract_birth_year(raw: &str) -> Option<i32> {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return None;
    }

    let year: i32 = digits[digits.len() - 4..]
        .iter()
        .collect::<String>()
        .parse()
        .ok()?;

    (year >= MIN_BIRTH_YEAR).then_some(year)
}

/// Whether a birth year falls in `[current_year - 17, current_year]`.
#[must_use]
pub const fn is_minor_birth_year(birth_year: i32, current_year: i32) -> bool {
    birth_year >= current_year - MINOR_MAX_AGE && birth_year <= current_year
}
