//! Credential expiry decoding.
//!
//! The credential is a JWT; only the payload's `exp` claim (seconds since
//! the epoch) is read. The signature is the backend's business and is not
//! checked here.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential is not a three-part token")]
    InvalidFormat,

    #[error("Credential payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Credential claims are not valid JSON: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("Credential has no usable exp claim")]
    MissingExpiry,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<f64>,
}

/// Expiry of `credential` as epoch milliseconds.
pub fn decode_expiry(credential: &str) -> Result<i64, CredentialError> {
    let mut parts = credential.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CredentialError::InvalidFormat);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;

    match claims.exp {
        Some(exp) if exp.is_finite() && exp >= 0.0 => Ok((exp * 1000.0) as i64),
        _ => Err(CredentialError::MissingExpiry),
    }
}

#[cfg(test)]
pub(crate) fn token_with_claims(claims: &str) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims)
    )
}
