//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The message sent to the client when an error should not be explained to them.
pub const INTERNAL_ERROR_MSG: &str =
    "An unexpected error occurred, check the server logs for more details.";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a session cookie, or the session it refers
    /// to is unknown or has expired.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The identity token presented at log-in could not be verified.
    ///
    /// The string holds the reason and should only be logged on the server.
    #[error("Invalid token!")]
    InvalidToken(String),

    /// The request body was malformed or a field was out of range.
    ///
    /// The message is shown to the client verbatim.
    #[error("{0}")]
    Validation(String),

    /// The requested resource was not found.
    ///
    /// Records owned by another user are reported as not found so that a
    /// client cannot learn whether they exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The key for verifying identity tokens could not be loaded.
    #[error("invalid identity key: {0}")]
    InvalidKey(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// A money total or a session expiry time fell outside the range that
    /// can be represented.
    #[error("a calculated value is out of range")]
    Overflow,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated | Error::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidKey(_)
            | Error::SqlError(_)
            | Error::Overflow
            | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Error::InvalidToken(reason) => {
                tracing::warn!("Rejected identity token: {reason}");
                "Invalid token!".to_owned()
            }
            Error::Unauthenticated | Error::Validation(_) | Error::NotFound => self.to_string(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                INTERNAL_ERROR_MSG.to_owned()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
