//! Reports whether the client holds a valid session.

use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error,
    auth::{AuthState, log_in::AuthStatus, middleware::authenticate},
};

/// Report whether the session cookie refers to a live session.
///
/// A missing, unknown or expired session is not an error here; the response
/// is `{"authenticated": false}`.
///
/// # Errors
///
/// Returns an error only if the session store could not be read.
pub async fn get_check_auth(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<Json<AuthStatus>, Error> {
    let authenticated = match authenticate(&jar, &state.db_connection) {
        Ok(_) => true,
        Err(Error::Unauthenticated) => false,
        Err(error) => return Err(error),
    };

    Ok(Json(AuthStatus { authenticated }))
}
