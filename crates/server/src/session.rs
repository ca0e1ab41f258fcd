// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! The session token is read from the `session` cookie set at login, or
//! from an `Authorization: Bearer <token>` header for API clients.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use repatria_api::{AuthenticatedActor, AuthenticationService};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::AppState;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session";

/// Extractor for authenticated operators.
///
/// ```ignore
/// async fn my_handler(
///     SessionOperator(actor, token): SessionOperator,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // token: the session token, needed for logout
/// }
/// ```
///
/// # Errors
///
/// Rejects with 401 Unauthorized if no token is present, the token is
/// unknown or idle too long, or the operator is disabled.
pub struct SessionOperator(pub AuthenticatedActor, pub String);

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = session_token(&parts.headers).ok_or_else(|| {
            debug!("Request carries no session");
            SessionError::MissingSession
        })?;

        let mut persistence = state.persistence.lock().await;
        let actor: AuthenticatedActor = AuthenticationService::validate_session(
            &mut persistence,
            &token,
            OffsetDateTime::now_utc(),
        )
        .map_err(|e| {
            warn!(error = %e, "Session validation failed");
            SessionError::InvalidSession(e.to_string())
        })?;

        debug!(
            username = %actor.username,
            role = %actor.role,
            "Session validated successfully"
        );

        Ok(Self(actor, token))
    }
}

/// Finds the session token, preferring the cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
        })
}

/// The `Set-Cookie` value that starts a session.
#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax")
}

/// The `Set-Cookie` value that ends a session.
#[must_use]
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Neither a session cookie nor a bearer token was sent.
    MissingSession,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingSession => String::from("Login required"),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        crate::HttpError {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
        .into_response()
    }
}
