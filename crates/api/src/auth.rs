// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use repatria_audit::Actor;
use repatria_domain::{Role, format_timestamp, parse_timestamp};
use repatria_persistence::{Persistence, PersistenceError, SessionData, UserData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// An authenticated operator.
///
/// Built from the user row behind a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's database ID.
    pub user_id: i64,
    /// The login name.
    pub username: String,
    /// The display name.
    pub full_name: String,
    /// The role assigned to this operator.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, username: String, full_name: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            full_name,
            role,
        }
    }

    /// Builds the actor from a stored user.
    #[must_use]
    pub fn from_user(user: &UserData) -> Self {
        Self::new(
            user.user_id,
            user.username.clone(),
            user.full_name.clone(),
            user.role,
        )
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit entries to attribute actions
    /// to the authenticated operator.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.user_id, self.username.clone())
    }
}

/// Authorization service for enforcing role-based access control.
///
/// This service determines whether an authenticated actor has permission
/// to perform a specific action based on their role.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may register or edit repatriants.
    ///
    /// Social adaptation and housing department staff may not.
    ///
    /// # Errors
    ///
    /// Returns an error if the role may not register repatriants.
    pub fn authorize_register_repatriant(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        if actor.role.can_register_repatriants() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from("register_repatriant"),
                required_role: String::from("ADMIN or USER"),
            })
        }
    }

    /// Checks if an actor may use the social view and social case notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither social adaptation staff nor
    /// an admin.
    pub fn authorize_social(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role.can_view_social() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("SOCIAL_ADAPTATION or ADMIN"),
            })
        }
    }

    /// Checks if an actor may use the housing view, department records,
    /// and the housing queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither housing staff nor an admin.
    pub fn authorize_housing(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role.can_view_housing() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("HOUSING_DEPARTMENT or ADMIN"),
            })
        }
    }

    /// Checks if an actor is an admin.
    ///
    /// Users, logs, reports, exports, storage statistics, repatriant history,
    /// and restores are admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("ADMIN"),
            })
        }
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Sessions idle for longer than this are cleared.
    pub const SESSION_IDLE_TIMEOUT: Duration = Duration::hours(24);

    /// Verifies credentials and opens a session.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `session`)
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown, inactive, or the password
    /// does not match.
    pub fn login(
        persistence: &mut Persistence,
        username: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(String, AuthenticatedActor, SessionData), AuthError> {
        let user: UserData = persistence
            .get_user_by_username(username.trim())
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                debug!(username, "Login for unknown user");
                Self::invalid_credentials()
            })?;

        if !user.is_active {
            warn!(username = %user.username, "Login attempt for inactive user");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let matches: bool = bcrypt::verify(password, &user.password_hash).map_err(|e| {
            AuthError::AuthenticationFailed {
                reason: format!("Failed to verify password: {e}"),
            }
        })?;
        if !matches {
            debug!(username = %user.username, "Password mismatch");
            return Err(Self::invalid_credentials());
        }

        let session_token: String = Self::generate_session_token();
        let now_text: String = format_timestamp(now);
        let expires_at: String = format_timestamp(now + Self::SESSION_IDLE_TIMEOUT);

        let session_id: i64 = persistence
            .create_session(&session_token, user.user_id, &now_text, &expires_at)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        persistence
            .update_last_login(user.user_id, &now_text)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to update last login: {e}"),
            })?;

        info!(user_id = user.user_id, username = %user.username, "User logged in");

        let session: SessionData = SessionData {
            session_id,
            session_token: session_token.clone(),
            user_id: user.user_id,
            created_at: now_text.clone(),
            last_activity_at: now_text,
            expires_at,
        };

        Ok((session_token, AuthenticatedActor::from_user(&user), session))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// A session idle for [`Self::SESSION_IDLE_TIMEOUT`] or longer is
    /// deleted. A valid session has its activity time refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the user
    /// is gone or inactive.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let last_activity: OffsetDateTime =
            parse_timestamp(&session.last_activity_at).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to parse session activity time: {e}"),
                }
            })?;

        if now - last_activity >= Self::SESSION_IDLE_TIMEOUT {
            info!(user_id = session.user_id, "Session expired after inactivity");
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        if !user.is_active {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        persistence
            .touch_session(
                session.session_id,
                &format_timestamp(now),
                &format_timestamp(now + Self::SESSION_IDLE_TIMEOUT),
            )
            .map_err(Self::map_persistence_error)?;

        Ok(AuthenticatedActor::from_user(&user))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })?;

        Ok(())
    }

    /// Generates an unguessable session token.
    fn generate_session_token() -> String {
        format!(
            "{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid username or password"),
        }
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
