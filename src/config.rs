//! Command line and environment configuration for the server.

use std::{fs, path::PathBuf};

use clap::{ArgGroup, Parser};
use time::Duration;

use crate::{Error, app_state::LedgerOptions, auth::JwtVerifier};

/// The longest session that can be configured, ten years.
pub const MAX_SESSION_HOURS: i64 = 87_600;

/// The REST API server for WisePenny.
///
/// Every option can also be set with the environment variable named next to it.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("identity_key")
        .required(true)
        .args(["identity_secret", "identity_public_key"]),
))]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "WISEPENNY_DB_PATH")]
    pub db_path: PathBuf,

    /// The address to listen on.
    #[arg(long, env = "WISEPENNY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "WISEPENNY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory holding an SSL certificate `cert.pem` and key `key.pem`.
    ///
    /// The server uses plain HTTP when this is not set.
    #[arg(long, env = "WISEPENNY_CERT_PATH")]
    pub cert_path: Option<PathBuf>,

    /// How many hours a session lasts after log-in, at most ten years.
    #[arg(
        long,
        env = "WISEPENNY_SESSION_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SESSION_HOURS)
    )]
    pub session_hours: u32,

    /// The shared secret identity tokens are signed with (HS256).
    #[arg(long, env = "WISEPENNY_IDENTITY_SECRET", hide_env_values = true)]
    pub identity_secret: Option<String>,

    /// File path to the PEM encoded RSA public key identity tokens are signed with (RS256).
    #[arg(long, env = "WISEPENNY_IDENTITY_PUBLIC_KEY")]
    pub identity_public_key: Option<PathBuf>,

    /// The audience identity tokens must be issued for.
    #[arg(long, env = "WISEPENNY_IDENTITY_AUDIENCE")]
    pub identity_audience: Option<String>,

    /// The issuer identity tokens must come from.
    #[arg(long, env = "WISEPENNY_IDENTITY_ISSUER")]
    pub identity_issuer: Option<String>,

    /// The origin of a client app served from elsewhere, e.g. "http://localhost:5173".
    ///
    /// Setting this also sends the session cookie with `SameSite=None`.
    #[arg(long, env = "WISEPENNY_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Directory of static files, e.g. the built client app, to serve.
    #[arg(long, env = "WISEPENNY_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Reject cash and checking expenses larger than the account's balance.
    #[arg(long, env = "WISEPENNY_REQUIRE_SUFFICIENT_FUNDS")]
    pub require_sufficient_funds: bool,
}

impl Config {
    /// How long a session lasts after log-in.
    pub fn session_duration(&self) -> Duration {
        Duration::hours(i64::from(self.session_hours))
    }

    /// The ledger rules selected by the command line.
    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions {
            require_sufficient_funds: self.require_sufficient_funds,
        }
    }

    /// Build the identity token verifier from the configured key.
    ///
    /// An RSA public key takes precedence over a shared secret.
    ///
    /// # Errors
    /// Returns [Error::InvalidKey] if the public key file cannot be read or is
    /// not a valid RSA public key, or if no key is configured.
    pub fn token_verifier(&self) -> Result<JwtVerifier, Error> {
        let audience = self.identity_audience.as_deref();
        let issuer = self.identity_issuer.as_deref();

        match (&self.identity_public_key, &self.identity_secret) {
            (Some(key_path), _) => {
                let pem = fs::read(key_path).map_err(|error| {
                    Error::InvalidKey(format!("could not read {}: {error}", key_path.display()))
                })?;

                JwtVerifier::from_rsa_pem(&pem, audience, issuer)
            }
            (None, Some(secret)) => Ok(JwtVerifier::from_secret(
                secret.as_bytes(),
                audience,
                issuer,
            )),
            (None, None) => Err(Error::InvalidKey(
                "no identity secret or public key was given".to_owned(),
            )),
        }
    }
}
