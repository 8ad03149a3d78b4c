//! Bearer-token authentication.
//!
//! `token` verifies credentials, `middleware` turns a request's
//! `Authorization` header into a [`CallerId`] (or rejects it), and
//! `extractors` hands that identity to handlers.

pub mod extractors;
pub mod middleware;
pub mod token;

pub use extractors::CallerId;
pub use middleware::{authenticate, AuthGate};
pub use token::{verify_token, TokenError};

/// Scheme prefix expected at the start of the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";
