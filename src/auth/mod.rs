//! Session based authentication: the session store, the session cookie,
//! identity token verification and the log-in/log-out routes.

mod check_auth;
mod cookie;
mod identity;
mod log_in;
mod log_out;
mod middleware;
mod session;

pub use check_auth::get_check_auth;
pub use cookie::DEFAULT_SESSION_DURATION;
pub use identity::{JwtVerifier, TokenVerifier};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::{AuthState, auth_guard};
pub use session::create_session_table;

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
