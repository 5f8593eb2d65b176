//! Log-out route handler that ends the session and expires the session cookie.

use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;
use serde_json::{Value, json};

use crate::{
    Error,
    auth::{
        AuthState,
        cookie::{get_session_id_from_cookies, invalidate_session_cookie},
        session::destroy_session,
    },
    db::lock_connection,
};

/// End the client's session and invalidate the session cookie.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the session could not be deleted.
pub async fn post_log_out(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<Value>), Error> {
    if let Ok(session_id) = get_session_id_from_cookies(&jar) {
        let connection = lock_connection(&state.db_connection)?;
        destroy_session(&session_id, &connection)?;
    }

    Ok((
        invalidate_session_cookie(jar, state.cookie_same_site),
        Json(json!({ "message": "Logout successful!" })),
    ))
}
