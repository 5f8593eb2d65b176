//! Defines functions for carrying the session ID in an encrypted cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::session::{Session, SessionId},
};

pub(crate) const COOKIE_SESSION: &str = "session";
/// The default duration for which sessions are valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(1);

/// Add the session cookie for `session` to the cookie jar.
///
/// The cookie expires at the same time as the session.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    session: &Session,
    same_site: SameSite,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, session.id.as_str().to_owned()))
            .expires(session.expires_at)
            .path("/")
            .http_only(true)
            .same_site(same_site)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(
    jar: PrivateCookieJar,
    same_site: SameSite,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(same_site)
            .secure(true),
    )
}

/// Get the session ID from the session cookie.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if the cookie is missing, or could not be
/// decrypted with the jar's key.
pub(crate) fn get_session_id_from_cookies(jar: &PrivateCookieJar) -> Result<SessionId, Error> {
    jar.get(COOKIE_SESSION)
        .map(|cookie| SessionId::new(cookie.value_trimmed()))
        .ok_or(Error::Unauthenticated)
}
