// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Free-text normalization applied before rows are written.

/// The value of the nationality selector that switches to free text.
pub const OTHER_NATIONALITY: &str = "OTHER";

/// Feminine nationality forms and their canonical masculine form.
const NATIONALITY_CANONICAL_FORMS: [(&str, &str); 5] = [
    ("АБХАЗКА", "АБХАЗ"),
    ("АБАЗИНКА", "АБАЗИН"),
    ("КАБАРДИНКА", "КАБАРДИНЕЦ"),
    ("АДЫГЕЙКА", "АДЫГ"),
    ("УБЫХКА", "УБЫХ"),
];

/// Uppercases a free-text value.
///
/// Blank values (empty or whitespace only) are returned unchanged. Applying
/// this twice yields the same result as applying it once.
#[must_use]
pub fn to_upper(value: &str) -> String {
    if value.trim().is_empty() {
        value.to_string()
    } else {
        value.to_uppercase()
    }
}

/// Uppercases an optional free-text column value.
#[must_use]
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value.map(|v| to_upper(&v))
}

/// Trims a value and maps blank input to `None`.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Maps a nationality to its canonical form.
///
/// Known feminine forms map to the masculine form; known canonical values
/// come back uppercased; anything else is only trimmed.
#[must_use]
pub fn normalize_nationality(value: &str) -> String {
    let upper: String = value.trim().to_uppercase();

    for (feminine, canonical) in NATIONALITY_CANONICAL_FORMS {
        if upper == feminine || upper == canonical {
            return canonical.to_string();
        }
    }

    value.trim().to_string()
}

/// Resolves the nationality from the selector and its free-text companion.
///
/// Selecting [`OTHER_NATIONALITY`] takes the free-text value instead.
/// Blank results become `None`.
#[must_use]
pub fn resolve_nationality(selected: Option<&str>, other: Option<&str>) -> Option<String> {
    let raw: &str = if selected == Some(OTHER_NATIONALITY) {
        other.unwrap_or_default()
    } else {
        selected.unwrap_or_default()
    };

    let normalized: String = normalize_nationality(raw);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
