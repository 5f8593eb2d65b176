//! The session store: maps opaque session IDs to authenticated users.
//!
//! Only a SHA-256 digest of each session ID is written to the database, so a
//! leaked database does not contain usable session cookies.

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, user::UserId};

/// An opaque, unguessable session identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a session ID received from a client.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The session ID as sent to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn digest(&self) -> String {
        Sha256::digest(self.0.as_bytes())
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

/// A server-side record binding a session ID to a user.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    /// The ID handed to the client in the session cookie.
    pub id: SessionId,
    /// The user the session authenticates.
    pub user_id: UserId,
    /// When the session was created.
    pub created_at: OffsetDateTime,
    /// When the session stops being valid.
    pub expires_at: OffsetDateTime,
}

/// Create the session table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS session (
                id_digest TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Start a new session for `user_id` that lasts for `duration`.
///
/// # Errors
///
/// Returns a [Error::SqlError] if the session could not be stored, e.g. if
/// `user_id` does not refer to a registered user, or [Error::Overflow] if
/// `duration` puts the expiry past the largest representable date.
pub fn create_session(
    user_id: &UserId,
    duration: Duration,
    connection: &Connection,
) -> Result<Session, Error> {
    let id = SessionId::generate();
    let created_at = OffsetDateTime::now_utc();
    let expires_at = created_at.checked_add(duration).ok_or(Error::Overflow)?;

    connection.execute(
        "INSERT INTO session (id_digest, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        (
            id.digest(),
            user_id,
            created_at.unix_timestamp(),
            expires_at.unix_timestamp(),
        ),
    )?;

    Ok(Session {
        id,
        user_id: user_id.clone(),
        created_at,
        expires_at,
    })
}

/// Get the user that `session_id` authenticates.
///
/// An expired session found here is deleted.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if the session is unknown or has expired,
/// or [Error::SqlError] if there was some other SQL error.
pub fn validate_session(session_id: &SessionId, connection: &Connection) -> Result<UserId, Error> {
    let digest = session_id.digest();
    let (user_id, expires_at): (UserId, i64) = connection
        .prepare("SELECT user_id, expires_at FROM session WHERE id_digest = :id_digest")?
        .query_row(&[(":id_digest", &digest)], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::Unauthenticated,
            error => error.into(),
        })?;

    if expires_at <= OffsetDateTime::now_utc().unix_timestamp() {
        tracing::debug!("Rejected expired session for user {user_id}");
        connection.execute(
            "DELETE FROM session WHERE id_digest = :id_digest",
            &[(":id_digest", &digest)],
        )?;
        return Err(Error::Unauthenticated);
    }

    Ok(user_id)
}

/// End the session `session_id`.
///
/// Destroying a session that does not exist is not an error.
///
/// # Errors
///
/// Returns a [Error::SqlError] if there was an SQL error.
pub fn destroy_session(session_id: &SessionId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM session WHERE id_digest = :id_digest",
        &[(":id_digest", &session_id.digest())],
    )?;

    Ok(())
}

/// Delete every session that has expired and return how many were deleted.
///
/// # Errors
///
/// Returns a [Error::SqlError] if there was an SQL error.
pub fn delete_expired_sessions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM session WHERE expires_at <= ?1",
            (OffsetDateTime::now_utc().unix_timestamp(),),
        )
        .map_err(|error| error.into())
}
