// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{non_blank, normalize_nationality, normalize_text, resolve_nationality, to_upper};

#[test]
fn test_to_upper_handles_cyrillic() {
    assert_eq!(to_upper("иванов"), "ИВАНОВ");
    assert_eq!(to_upper("Сухум, ул. Мира"), "СУХУМ, УЛ. МИРА");
}

#[test]
fn test_to_upper_leaves_blank_values_alone() {
    assert_eq!(to_upper(""), "");
    assert_eq!(to_upper("   "), "   ");
}

#[test]
fn test_uppercase_is_idempotent() {
    for value in ["ivanov", "Абхазия", "mixed Case 12", "", "  ", "ß"] {
        let once: String = to_upper(value);
        assert_eq!(to_upper(&once), once, "not idempotent for {value:?}");
    }
}

#[test]
fn test_normalize_text_keeps_none() {
    assert_eq!(normalize_text(None), None);
    assert_eq!(
        normalize_text(Some(String::from("гагра"))),
        Some(String::from("ГАГРА"))
    );
}

#[test]
fn test_non_blank_trims() {
    assert_eq!(non_blank(Some("  A-12 ")), Some(String::from("A-12")));
    assert_eq!(non_blank(Some("   ")), None);
    assert_eq!(non_blank(None), None);
}

#[test]
fn test_feminine_nationalities_map_to_canonical_form() {
    assert_eq!(normalize_nationality("абхазка"), "АБХАЗ");
    assert_eq!(normalize_nationality(" Абазинка "), "АБАЗИН");
    assert_eq!(normalize_nationality("КАБАРДИНКА"), "КАБАРДИНЕЦ");
    assert_eq!(normalize_nationality("адыгейка"), "АДЫГ");
    assert_eq!(normalize_nationality("убыхка"), "УБЫХ");
}

#[test]
fn test_canonical_nationality_is_uppercased() {
    assert_eq!(normalize_nationality("абхаз"), "АБХАЗ");
}

#[test]
fn test_unknown_nationality_is_only_trimmed() {
    assert_eq!(normalize_nationality("  грузин "), "грузин");
}

#[test]
fn test_other_selection_uses_free_text() {
    assert_eq!(
        resolve_nationality(Some("OTHER"), Some(" Армянин ")),
        Some(String::from("Армянин"))
    );
    assert_eq!(resolve_nationality(Some("OTHER"), None), None);
    assert_eq!(
        resolve_nationality(Some("АБХАЗКА"), Some("ignored")),
        Some(String::from("АБХАЗ"))
    );
    assert_eq!(resolve_nationality(None, None), None);
}
