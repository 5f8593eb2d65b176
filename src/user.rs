//! Code for creating the user table and registering users on first log-in.

use std::fmt::Display;

use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// A newtype wrapper for user IDs.
///
/// User IDs are the stable subject identifiers issued by the identity
/// provider, so they are opaque strings rather than database integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(UserId)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The identity provider's ID for the user.
    pub id: UserId,
    /// When the user first logged in.
    pub created_at: OffsetDateTime,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Record the user with `user_id` unless they already exist, and return the stored user.
///
/// Users are created implicitly on their first successful log-in.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn ensure_user(user_id: &UserId, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO user (id, created_at) VALUES (?1, ?2)",
        (user_id, OffsetDateTime::now_utc().unix_timestamp()),
    )?;

    get_user(user_id, connection)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user(user_id: &UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", user_id)], |row| {
            let id = row.get(0)?;
            let created_at: i64 = row.get(1)?;
            let created_at = OffsetDateTime::from_unix_timestamp(created_at).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Integer,
                    Box::new(error),
                )
            })?;

            Ok(User { id, created_at })
        })
        .map_err(|error| error.into())
}
