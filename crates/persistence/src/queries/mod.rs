// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `repatriants` — Repatriant and dependent lookups, dashboard counts
//! - `search` — Advanced and quick search with dynamic filter composition
//! - `users` — Operator and session lookups
//! - `case_notes` — Social adaptation case notes
//! - `housing_department` — Housing department records
//! - `queue` — Housing waitlist entries
//! - `audit` — Audit trail
//! - `reports` — Aggregations for the admin reports and exports

pub mod audit;
pub mod case_notes;
pub mod housing_department;
pub mod queue;
pub mod reports;
pub mod repatriants;
pub mod search;
pub mod users;
