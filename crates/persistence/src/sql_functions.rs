// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Custom SQL functions registered on every connection.
//!
//! `SQLite` has neither a regular expression operator nor a string split, and
//! dependents store their birth year as loose text, so these are implemented
//! in Rust and exposed to queries under these names.

use diesel::define_sql_function;
use diesel::sql_types::{Bool, Integer, Nullable, Text};

define_sql_function! {
    /// Whether `needle` occurs in `haystack` as a whole word, ignoring case.
    fn word_match(haystack: Nullable<Text>, needle: Text) -> Bool;
}

define_sql_function! {
    /// The 1-based `index`-th part of `value` split on `delimiter`.
    fn split_part(value: Nullable<Text>, delimiter: Text, index: Integer) -> Nullable<Text>;
}

define_sql_function! {
    /// Whether a loosely formatted birth year is within the minor age window
    /// ending at `current_year`.
    fn is_minor_birth_year(birth_year: Nullable<Text>, current_year: Integer) -> Bool;
}

define_sql_function! {
    /// `SQLite`'s built-in `ifnull`. Declared for the query builder only; it
    /// is never registered.
    fn ifnull(value: Nullable<Text>, fallback: Text) -> Text;
}
