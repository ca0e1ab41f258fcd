// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! Connection setup, migrations, PRAGMA configuration, and the custom SQL
//! functions the search relies on. Everything that can be expressed in
//! Diesel DSL lives in `queries/` and `mutations/` instead.

pub mod sqlite;
