//! WisePenny is a web service for tracking personal expenses and the cash and
//! checking balances they are paid from.
//!
//! This library provides a JSON REST API for a single-page client app. Users
//! log in with an identity token from a third-party identity provider and are
//! then identified by an encrypted session cookie.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod amount;
mod analysis;
mod app_state;
mod auth;
mod balance;
mod config;
mod database_id;
mod db;
mod endpoints;
mod error;
mod expense;
mod json;
mod logging;
mod routing;
mod user;

#[cfg(test)]
mod test_utils;

pub use amount::Amount;
pub use app_state::{AppState, LedgerOptions};
pub use auth::{JwtVerifier, TokenVerifier};
pub use balance::{Account, add_funds};
pub use config::Config;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{ExpenseFields, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, REQUEST_BODY_SIZE_LIMIT, logging_middleware};
pub use routing::{build_router, cors_layer, serve_static_files};
pub use user::{User, UserId, ensure_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
