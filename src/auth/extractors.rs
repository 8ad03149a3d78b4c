use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::fmt;
use std::future::{ready, Ready};

use crate::error::AppError;

/// The verified subject of the current request's credential.
///
/// Inserted into request extensions by `AuthGate`; handlers receive it as an
/// extractor. It lives for one request and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromRequest for CallerId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CallerId>().cloned() {
            Some(caller) => ready(Ok(caller)),
            None => {
                // Only reachable when a handler is mounted outside the auth gate.
                let err = AppError::Unauthorized("No caller identity on request".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
