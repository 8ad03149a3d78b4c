use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Only the subject is read from the payload. It is kept as a raw JSON value so
/// that a non-string `sub` can be told apart from a token that fails to parse.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<Value>,
}

/// Why a bearer token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signature, algorithm, audience or not-before check failed.
    Invalid,
    /// The `exp` claim has passed.
    Expired,
    /// The token could not be parsed.
    Malformed,
    /// Correctly signed, but without a usable string `sub` claim.
    InvalidPayload,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            TokenError::Invalid => "invalid signature",
            TokenError::Expired => "token expired",
            TokenError::Malformed => "malformed token",
            TokenError::InvalidPayload => "invalid payload",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for TokenError {}

/// Verifies an HS256 token against `secret` and returns its subject.
///
/// Expiry is always enforced (with the library's default leeway). The `aud`
/// claim is checked only when `audience` is given.
///
/// # Arguments
/// * `token` - The JWT string, without the `Bearer ` prefix.
/// * `secret` - The shared signing secret.
/// * `audience` - Expected audience, if any.
pub fn verify_token(
    token: &str,
    secret: &str,
    audience: Option<&str>,
) -> Result<String, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    match audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| classify(e.kind()))?;

    match data.claims.sub {
        Some(Value::String(subject)) if !subject.is_empty() => Ok(subject),
        _ => Err(TokenError::InvalidPayload),
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
        _ => TokenError::Invalid,
    }
}
