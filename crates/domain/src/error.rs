// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors raised by domain rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The role string is not one of the known roles.
    InvalidRole(String),
    /// A relationship value is empty or not allowed for the dependent kind.
    InvalidRelationship(String),
    /// A required field was missing or blank.
    MissingField(&'static str),
    /// The repatriant already has an active housing queue entry.
    AlreadyQueued {
        /// The repatriant that is already queued.
        repatriant_id: i64,
    },
    /// A stored timestamp could not be parsed.
    InvalidTimestamp(String),
    /// A date string could not be parsed where one was required.
    InvalidDate(String),
    /// An operator attempted a destructive change on their own account.
    SelfModification(String),
    /// The username is already taken.
    DuplicateUsername(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRole(role) => write!(f, "Invalid role: {role}"),
            Self::InvalidRelationship(value) => write!(f, "Invalid relationship: {value}"),
            Self::MissingField(field) => write!(f, "Required field '{field}' is missing"),
            Self::AlreadyQueued { repatriant_id } => {
                write!(f, "Repatriant {repatriant_id} is already in the housing queue")
            }
            Self::InvalidTimestamp(value) => write!(f, "Invalid timestamp: {value}"),
            Self::InvalidDate(value) => write!(f, "Invalid date: {value}"),
            Self::SelfModification(action) => {
                write!(f, "Cannot {action} your own account")
            }
            Self::DuplicateUsername(username) => {
                write!(f, "Username '{username}' already exists")
            }
        }
    }
}

impl std::error::Error for DomainError {}
