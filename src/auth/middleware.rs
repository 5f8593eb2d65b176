//! Authentication middleware that validates the session cookie of protected routes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Key, SameSite},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{cookie::get_session_id_from_cookies, session::validate_session},
    db::lock_connection,
    user::UserId,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The `SameSite` attribute of the session cookie.
    pub cookie_same_site: SameSite,
    /// The database connection holding the session store.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_same_site: state.cookie_same_site,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Get the user authenticated by the session cookie in `jar`.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if there is no session cookie or the
/// session is unknown or expired.
pub(crate) fn authenticate(
    jar: &PrivateCookieJar,
    db_connection: &Mutex<Connection>,
) -> Result<UserId, Error> {
    let session_id = get_session_id_from_cookies(jar)?;
    let connection = lock_connection(db_connection)?;

    validate_session(&session_id, &connection)
}

/// Middleware function that checks for a valid session cookie.
///
/// The user ID is placed into the request and the request executed normally
/// if the session is valid, otherwise a `401 Unauthorized` JSON error is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserId>` to receive the user ID.
pub async fn auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match authenticate(&jar, &state.db_connection) {
        Ok(user_id) => user_id,
        Err(error) => return error.into_response(),
    };

    request.extensions_mut().insert(user_id);
    next.run(request).await
}

#[cfg(test)]
mod auth_guard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Router, extract::State, http::StatusCode, middleware, routing::get,
        routing::post,
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use sha2::Digest;
    use time::Duration;

    use crate::{
        Error,
        auth::{
            AuthState, auth_guard,
            cookie::{COOKIE_SESSION, set_session_cookie},
            session::create_session,
        },
        db::initialize,
        user::{UserId, ensure_user},
    };

    async fn test_handler(Extension(user_id): Extension<UserId>) -> String {
        user_id.to_string()
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let connection = state.db_connection.lock().unwrap();
        let user_id = UserId::new("alice");
        ensure_user(&user_id, &connection)?;
        let session = create_session(&user_id, Duration::hours(1), &connection)?;

        Ok(set_session_cookie(jar, &session, state.cookie_same_site))
    }

    async fn stub_expired_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let connection = state.db_connection.lock().unwrap();
        let user_id = UserId::new("alice");
        ensure_user(&user_id, &connection)?;
        let mut session = create_session(&user_id, Duration::seconds(-5), &connection)?;
        // Give the cookie a future expiry so the client still sends it.
        session.expires_at += Duration::hours(1);

        Ok(set_session_cookie(jar, &session, state.cookie_same_site))
    }

    const TEST_PROTECTED_ROUTE: &str = "/protected";

    fn get_test_server() -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let state = AuthState {
            cookie_key: Key::from(&hash),
            cookie_same_site: SameSite::Strict,
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route("/log_in", post(stub_log_in_route))
            .route("/log_in_expired", post(stub_expired_log_in_route))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let server = get_test_server();
        let response = server.post("/log_in").await;

        response.assert_status_ok();
        let session_cookie = response.cookie(COOKIE_SESSION);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(session_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text("alice");
    }

    #[tokio::test]
    async fn get_protected_route_with_no_cookie_is_unauthorized() {
        let server = get_test_server();

        server
            .get(TEST_PROTECTED_ROUTE)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_forged_cookie_is_unauthorized() {
        let server = get_test_server();

        server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_SESSION, "FOOBAR")).build())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_session_is_unauthorized() {
        let server = get_test_server();
        let response = server.post("/log_in_expired").await;

        response.assert_status_ok();
        let session_cookie = response.cookie(COOKIE_SESSION);

        server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(session_cookie)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
