//! Handles log-in requests: exchanges an identity token for a session cookie.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Key, SameSite},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        TokenVerifier,
        cookie::{get_session_id_from_cookies, set_session_cookie},
        session::{create_session, delete_expired_sessions, destroy_session},
    },
    db::lock_connection,
    json::JsonBody,
    user::ensure_user,
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The `SameSite` attribute of the session cookie.
    pub cookie_same_site: SameSite,
    /// How long a new session lasts.
    pub session_duration: Duration,
    /// Verifies the identity token in the log-in request.
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_same_site: state.cookie_same_site,
            session_duration: state.session_duration,
            token_verifier: state.token_verifier.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The body of a log-in request.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The identity token issued to the client by the identity provider.
    #[serde(rename = "idToken")]
    pub id_token: String,
}

/// Whether the client holds a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
}

/// Handler for log-in requests via the POST method.
///
/// On success the user is registered if this is their first log-in, a new
/// session is started and the session cookie is set. Any session the client
/// already held is ended.
///
/// # Errors
///
/// This function will return an error if:
/// - the body does not contain an identity token,
/// - the identity token could not be verified,
/// - the session could not be stored.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    JsonBody(data): JsonBody<LogInData>,
) -> Result<(PrivateCookieJar, Json<AuthStatus>), Error> {
    let user_id = state.token_verifier.verify_token(&data.id_token)?;

    let connection = lock_connection(&state.db_connection)?;

    if let Ok(previous_session) = get_session_id_from_cookies(&jar) {
        destroy_session(&previous_session, &connection)?;
    }

    let expired_count = delete_expired_sessions(&connection)?;
    if expired_count > 0 {
        tracing::debug!("Deleted {expired_count} expired sessions");
    }

    ensure_user(&user_id, &connection)?;
    let session = create_session(&user_id, state.session_duration, &connection)?;
    tracing::info!("User {user_id} logged in");

    Ok((
        set_session_cookie(jar, &session, state.cookie_same_site),
        Json(AuthStatus {
            authenticated: true,
        }),
    ))
}
