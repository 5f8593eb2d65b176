//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::{Key, SameSite};
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_SESSION_DURATION, TokenVerifier},
    db::initialize,
};

/// Switches for ledger rules that differ between deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerOptions {
    /// Reject expenses paid by cash or checking that exceed that account's balance.
    pub require_sufficient_funds: bool,
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The `SameSite` attribute of the session cookie.
    pub cookie_same_site: SameSite,

    /// How long a session lasts after log-in.
    pub session_duration: Duration,

    /// Verifies the identity tokens presented at log-in.
    pub token_verifier: Arc<dyn TokenVerifier>,

    /// Rules applied when recording expenses.
    pub ledger_options: LedgerOptions,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        token_verifier: Arc<dyn TokenVerifier>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_same_site: SameSite::Strict,
            session_duration: DEFAULT_SESSION_DURATION,
            token_verifier,
            ledger_options: LedgerOptions::default(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }

    /// Set how long sessions last after log-in.
    pub fn with_session_duration(mut self, session_duration: Duration) -> Self {
        self.session_duration = session_duration;
        self
    }

    /// Set the `SameSite` attribute of the session cookie.
    ///
    /// A client app served from another site needs [SameSite::None] for its
    /// browser to send the cookie with API requests.
    pub fn with_cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    /// Set the rules applied when recording expenses.
    pub fn with_ledger_options(mut self, ledger_options: LedgerOptions) -> Self {
        self.ledger_options = ledger_options;
        self
    }
}

/// The state needed by the expense and balance endpoints.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// Rules applied when recording expenses.
    pub ledger_options: LedgerOptions,
    /// The database connection holding each user's ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger_options: state.ledger_options,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
