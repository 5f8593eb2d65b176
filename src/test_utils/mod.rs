#![allow(missing_docs)]

use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error, app_state::LedgerOptions, auth::TokenVerifier, build_router, endpoints,
    user::UserId,
};

/// Accepts tokens of the form "valid:<user id>" and rejects everything else.
#[derive(Debug)]
pub(crate) struct StubVerifier;

impl TokenVerifier for StubVerifier {
    fn verify_token(&self, token: &str) -> Result<UserId, Error> {
        token
            .strip_prefix("valid:")
            .filter(|user_id| !user_id.is_empty())
            .map(UserId::new)
            .ok_or_else(|| Error::InvalidToken(format!("unrecognised test token {token:?}")))
    }
}

pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "42", Arc::new(StubVerifier))
        .expect("Could not create app state")
}

pub(crate) fn get_test_server() -> TestServer {
    get_test_server_with_state(get_test_state())
}

pub(crate) fn get_test_server_with_options(ledger_options: LedgerOptions) -> TestServer {
    get_test_server_with_state(get_test_state().with_ledger_options(ledger_options))
}

pub(crate) fn get_test_server_with_state(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// Log in as `user_id` and return the session cookie.
pub(crate) async fn log_in(server: &TestServer, user_id: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "idToken": format!("valid:{user_id}") }))
        .await;

    response.assert_status_ok();
    response.cookie(crate::auth::COOKIE_SESSION)
}
