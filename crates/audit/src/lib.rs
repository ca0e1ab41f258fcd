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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use repatria_domain::to_upper;

/// The operator responsible for a logged action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The user id, if the action was taken by a known user.
    pub user_id: Option<i64>,
    /// The username at the time of the action.
    pub username: String,
}

impl Actor {
    /// Creates an actor for an authenticated user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's id
    /// * `username` - The user's login name
    #[must_use]
    pub const fn new(user_id: i64, username: String) -> Self {
        Self {
            user_id: Some(user_id),
            username,
        }
    }

    /// The actor used for startup tasks such as bootstrapping the first admin.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user_id: None,
            username: String::from("SYSTEM"),
        }
    }
}

/// What happened.
///
/// `name` is a stable identifier used by reports; `details` is free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// An append-only audit log entry, optionally tied to a repatriant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub actor: Actor,
    pub action: Action,
    pub repatriant_id: Option<i64>,
}

impl AuditEntry {
    #[must_use]
    pub const fn new(actor: Actor, action: Action, repatriant_id: Option<i64>) -> Self {
        Self {
            actor,
            action,
            repatriant_id,
        }
    }

    /// The uppercased action text that is stored with the entry.
    ///
    /// This is the details when present, otherwise the action name.
    #[must_use]
    pub fn action_text(&self) -> String {
        to_upper(self.action.details.as_deref().unwrap_or(&self.action.name))
    }

    /// The human-readable log line, `username: ACTION`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}: {}", self.actor.username, self.action_text())
    }
}

/// Stable action names recorded in the audit log.
pub mod actions {
    pub const LOGIN: &str = "LOGIN";
    pub const LOGOUT: &str = "LOGOUT";
    pub const REGISTER_REPATRIANT: &str = "REGISTER_REPATRIANT";
    pub const EDIT_REPATRIANT: &str = "EDIT_REPATRIANT";
    pub const DELETE_REPATRIANT: &str = "DELETE_REPATRIANT";
    pub const REPLACE_FAMILY: &str = "REPLACE_FAMILY";
    pub const CREATE_CASE_NOTE: &str = "CREATE_CASE_NOTE";
    pub const UPDATE_CASE_NOTE: &str = "UPDATE_CASE_NOTE";
    pub const DELETE_CASE_NOTE: &str = "DELETE_CASE_NOTE";
    pub const RESTORE_CASE_NOTE: &str = "RESTORE_CASE_NOTE";
    pub const CREATE_HOUSING_RECORD: &str = "CREATE_HOUSING_RECORD";
    pub const UPDATE_HOUSING_RECORD: &str = "UPDATE_HOUSING_RECORD";
    pub const DELETE_HOUSING_RECORD: &str = "DELETE_HOUSING_RECORD";
    pub const QUEUE_ADD: &str = "QUEUE_ADD";
    pub const QUEUE_UPDATE: &str = "QUEUE_UPDATE";
    pub const QUEUE_REMOVE: &str = "QUEUE_REMOVE";
    pub const CREATE_USER: &str = "CREATE_USER";
    pub const TOGGLE_USER: &str = "TOGGLE_USER";
    pub const DELETE_USER: &str = "DELETE_USER";
    pub const GENERATE_FORM: &str = "GENERATE_FORM";
    pub const EXPORT: &str = "EXPORT";
}

#[cfg(test)]
mod tests;
