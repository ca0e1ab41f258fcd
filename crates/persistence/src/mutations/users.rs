// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use repatria_domain::{DomainError, Role};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use crate::queries::users::get_user_by_username;

/// Creates a new user.
///
/// The username is stored exactly as given and must be unique.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The login name
/// * `password` - The plain-text password (will be hashed)
/// * `full_name` - The display name
/// * `role` - The role
/// * `created_by` - The admin creating the user, if any
///
/// # Errors
///
/// Returns `Domain(DuplicateUsername)` if the username is taken, or an error
/// if hashing or the insert fails.
pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    full_name: &str,
    role: Role,
    created_by: Option<i64>,
) -> Result<i64, PersistenceError> {
    info!(
        "Creating user with username: {}, role: {}",
        username,
        role.as_str()
    );

    if get_user_by_username(conn, username)?.is_some() {
        return Err(DomainError::DuplicateUsername(username.to_string()).into());
    }

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(users::table)
        .values((
            users::username.eq(username),
            users::password_hash.eq(&password_hash),
            users::full_name.eq(full_name),
            users::role.eq(role.as_str()),
            users::created_by.eq(created_by),
        ))
        .execute(conn)
        .map_err(|e| match PersistenceError::from(e) {
            PersistenceError::UniqueViolation(_) => {
                DomainError::DuplicateUsername(username.to_string()).into()
            }
            other => other,
        })?;

    let user_id: i64 = get_last_insert_rowid(conn)?;

    info!(user_id, "User created successfully");
    Ok(user_id)
}

/// Updates the last login timestamp for a user.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    user_id: i64,
    at: &str,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for user ID: {}", user_id);

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::last_login_at.eq(at))
        .execute(conn)?;

    Ok(())
}

/// Activates or deactivates a user.
///
/// # Errors
///
/// Returns `NotFound` if the user does not exist.
pub fn set_user_active(
    conn: &mut SqliteConnection,
    user_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    info!(user_id, is_active, "Setting user active flag");

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::is_active.eq(is_active))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}

/// Deletes a user. Their sessions are removed with them and the records
/// they created keep a null author.
///
/// # Errors
///
/// Returns `NotFound` if the user does not exist.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<(), PersistenceError> {
    info!("Deleting user ID: {}", user_id);

    let rows_affected: usize = diesel::delete(users::table)
        .filter(users::user_id.eq(user_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}

/// Creates a session.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `user_id` - The user ID
/// * `now` - The creation time as a stored timestamp
/// * `expires_at` - The idle expiry as a stored timestamp
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    now: &str,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(user_id, expires_at, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(now),
            sessions::last_activity_at.eq(now),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Records activity on a session and pushes its expiry forward.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn touch_session(
    conn: &mut SqliteConnection,
    session_id: i64,
    now: &str,
    expires_at: &str,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set((
            sessions::last_activity_at.eq(now),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;
    Ok(())
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;
    Ok(())
}

/// Deletes every session of a user.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<usize, PersistenceError> {
    Ok(diesel::delete(sessions::table)
        .filter(sessions::user_id.eq(user_id))
        .execute(conn)?)
}

/// Deletes every session whose expiry is before `now`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    if deleted > 0 {
        info!(deleted, "Deleted expired sessions");
    }
    Ok(deleted)
}
