//! Verification of identity tokens issued by the third-party identity provider.

use std::fmt::Debug;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::{Error, user::UserId};

/// Verifies an identity token and returns the user it identifies.
pub trait TokenVerifier: Debug + Send + Sync {
    /// Check that `token` was issued by the identity provider and has not expired.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidToken] if the token cannot be verified.
    fn verify_token(&self, token: &str) -> Result<UserId, Error>;
}

/// The claims read from an identity token.
#[derive(Debug, Deserialize)]
struct IdentityClaims {
    /// The provider's stable ID for the user.
    sub: String,
}

/// Verifies identity tokens that are signed JSON Web Tokens.
///
/// The `sub` claim becomes the user ID. The `exp` claim is required, and the
/// `aud` and `iss` claims are checked when an audience or issuer is given.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    /// Create a verifier for tokens signed with HS256 and the shared `secret`.
    pub fn from_secret(secret: &[u8], audience: Option<&str>, issuer: Option<&str>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: build_validation(Algorithm::HS256, audience, issuer),
        }
    }

    /// Create a verifier for tokens signed with RS256, checked against the
    /// PEM encoded public key `pem`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidKey] if `pem` is not a valid RSA public key.
    pub fn from_rsa_pem(
        pem: &[u8],
        audience: Option<&str>,
        issuer: Option<&str>,
    ) -> Result<Self, Error> {
        let decoding_key =
            DecodingKey::from_rsa_pem(pem).map_err(|error| Error::InvalidKey(error.to_string()))?;

        Ok(Self {
            decoding_key,
            validation: build_validation(Algorithm::RS256, audience, issuer),
        })
    }
}

fn build_validation(
    algorithm: Algorithm,
    audience: Option<&str>,
    issuer: Option<&str>,
) -> Validation {
    let mut validation = Validation::new(algorithm);

    match audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }

    validation
}

impl TokenVerifier for JwtVerifier {
    fn verify_token(&self, token: &str) -> Result<UserId, Error> {
        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| Error::InvalidToken(error.to_string()))?;

        let subject = token_data.claims.sub.trim();
        if subject.is_empty() {
            return Err(Error::InvalidToken("empty subject claim".to_owned()));
        }

        Ok(UserId::new(subject))
    }
}
