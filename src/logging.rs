//! Middleware for logging requests and responses.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{Error, error::INTERNAL_ERROR_MSG};

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;
/// Request bodies larger than this many bytes are rejected.
pub const REQUEST_BODY_SIZE_LIMIT: usize = 2 * 1024 * 1024;

pub(crate) const BODY_UNREADABLE_MSG: &str =
    "Could not read the request body, it must be at most 2 MiB.";

const REDACTED: &str = "********";
const REDACTED_FIELDS: [&str; 1] = ["idToken"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level. Requests
/// with a body over [REQUEST_BODY_SIZE_LIMIT] bytes are rejected with a 400.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Identity tokens and
/// cookies are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, REQUEST_BODY_SIZE_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("could not read request body: {error}");
            return Error::Validation(BODY_UNREADABLE_MSG.to_owned()).into_response();
        }
    };

    log_request(
        &format!("{} {}", parts.method, parts.uri),
        &redact_headers(&parts.headers),
        &redact_body(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": INTERNAL_ERROR_MSG })),
            )
                .into_response();
        }
    };

    log_response(
        &parts.status.to_string(),
        &redact_headers(&parts.headers),
        &redact_body(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    for name in [COOKIE, SET_COOKIE] {
        if headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(REDACTED));
        }
    }

    headers
}

/// Replace the value of sensitive fields in a JSON object body.
///
/// Bodies that are not JSON objects are returned as text unchanged.
fn redact_body(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut object)) => {
            for field in REDACTED_FIELDS {
                if let Some(value) = object.get_mut(field) {
                    *value = Value::String(REDACTED.to_owned());
                }
            }

            Value::Object(object).to_string()
        }
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .map(|(index, _)| index)
        .find(|&index| index >= LOG_BODY_LENGTH_LIMIT)
        .map(|end| &body[..end])
}

fn log_request(request_line: &str, headers: &HeaderMap, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Received request: {request_line} {headers:?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {request_line} {headers:?}\nbody: {body:?}"),
    }
}

fn log_response(status: &str, headers: &HeaderMap, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {status} {headers:?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {status} {headers:?}\nbody: {body:?}"),
    }
}
