// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use repatria_domain::DomainError;
use repatria_persistence::PersistenceError;

use crate::storage::StorageError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Shorthand for a missing row.
    #[must_use]
    pub fn not_found(resource_type: &str, id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: format!("{resource_type} with ID {id} not found"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DisallowedExtension(_) | StorageError::InvalidPath(_) => {
                Self::InvalidInput {
                    field: String::from("file"),
                    message: err.to_string(),
                }
            }
            StorageError::NotFound(_) => Self::ResourceNotFound {
                resource_type: String::from("File"),
                message: err.to_string(),
            },
            StorageError::Io(_) | StorageError::Template(_) => Self::Internal {
                message: err.to_string(),
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidRole(role) => ApiError::InvalidInput {
            field: String::from("role"),
            message: format!("Invalid role: {role}"),
        },
        DomainError::InvalidRelationship(value) => ApiError::InvalidInput {
            field: String::from("relationship"),
            message: format!("Invalid relationship: {value}"),
        },
        DomainError::MissingField(field) => ApiError::InvalidInput {
            field: field.to_string(),
            message: String::from("This field is required"),
        },
        DomainError::AlreadyQueued { repatriant_id } => ApiError::DomainRuleViolation {
            rule: String::from("single_active_queue_entry"),
            message: format!("Repatriant {repatriant_id} is already in the housing queue"),
        },
        DomainError::InvalidTimestamp(value) => ApiError::Internal {
            message: format!("Stored timestamp is malformed: {value}"),
        },
        DomainError::InvalidDate(value) => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Invalid date: {value}"),
        },
        DomainError::SelfModification(action) => ApiError::DomainRuleViolation {
            rule: String::from("no_self_modification"),
            message: format!("Cannot {action} your own account"),
        },
        DomainError::DuplicateUsername(username) => ApiError::DomainRuleViolation {
            rule: String::from("unique_username"),
            message: format!("Username '{username}' already exists"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// `resource_type` names the entity reported when the row is missing.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError, resource_type: &str) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        },
        PersistenceError::Domain(domain_err) => translate_domain_error(domain_err),
        _ => ApiError::Internal {
            message: format!("Database error: {err}"),
        },
    }
}
