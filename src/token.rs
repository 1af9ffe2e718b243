//! Bearer token codec: issuance and validation of the signed handle claim.
//!
//! Tokens are HS256 JWTs whose sole claim is the owning account's handle.
//! They carry no expiry and there is no revocation list; validity is signature
//! verification plus the caller's own liveness check against the identity
//! store. Verification is stateless and deterministic, so it can be tested on
//! synthetic tokens alone.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Errors from the token codec.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed structure, undecodable claims, or signature mismatch.
    #[error("invalid token")]
    Invalid,
    /// Signing failed; key material unusable.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AppError::auth("invalid_token", "Unauthorized."),
            TokenError::Signing(msg) => AppError::internal("token_signing".to_string(), msg),
        }
    }
}

/// Claims embedded in a session token. The handle is the only claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_handle: String,
}

/// Signing and verification keys derived from one process-wide secret.
///
/// Constructed once at startup and injected into the server state; never a
/// hidden global, so tests can run isolated codecs with distinct secrets.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are time-unbounded: no exp claim is issued, so none is required.
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();
        TokenKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Produce a signed token embedding the handle as its sole claim.
    pub fn issue(&self, handle: &str) -> Result<String, TokenError> {
        let claims = Claims { user_handle: handle.to_string() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and structure, returning the embedded handle.
    ///
    /// No I/O and no store lookups; whether the handle still exists is the
    /// caller's concern.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.user_handle)
            .map_err(|_| TokenError::Invalid)
    }
}
