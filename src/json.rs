//! A JSON body extractor whose rejections use the app's error responses.

use axum::extract::FromRequest;

use crate::Error;

/// Like [axum::Json], but a malformed body is rejected with a `400` and a
/// `{"message": ...}` body instead of axum's plain text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
