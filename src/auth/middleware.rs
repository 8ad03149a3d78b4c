use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::CallerId;
use crate::auth::token::verify_token;
use crate::auth::BEARER_PREFIX;
use crate::config::AuthConfig;
use crate::error::AppError;

/// Resolves the caller behind a request's `Authorization` header.
///
/// Exactly one log line is written on each failure path. A missing secret is
/// an operator error and surfaces as `AppError::Internal`; every
/// caller-side problem surfaces as `AppError::Unauthorized`.
pub fn authenticate(config: &AuthConfig, headers: &HeaderMap) -> Result<CallerId, AppError> {
    let secret = match config.jwt_secret.as_deref() {
        Some(secret) => secret,
        None => {
            log::error!("JWT_SECRET is not configured; cannot verify bearer tokens");
            return Err(AppError::Internal(
                "Authentication is not configured".into(),
            ));
        }
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    let token = match token {
        Some(token) => token,
        None => {
            log::warn!("Rejected request without a bearer token");
            return Err(AppError::Unauthorized("Missing bearer token".into()));
        }
    };

    match verify_token(token, secret, config.jwt_audience.as_deref()) {
        Ok(subject) => {
            log::debug!("Authenticated subject {}", subject);
            Ok(CallerId(subject))
        }
        Err(reason) => {
            log::warn!("Rejected bearer token: {}", reason);
            Err(reason.into())
        }
    }
}

/// Middleware that authenticates every request in the scope it wraps and
/// stores the resulting [`CallerId`] in the request extensions.
pub struct AuthGate {
    config: Rc<AuthConfig>,
}

impl AuthGate {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Rc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service,
            config: Rc::clone(&self.config),
        }))
    }
}

pub struct AuthGateService<S> {
    service: S,
    config: Rc<AuthConfig>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&self.config, req.headers()) {
            Ok(caller) => {
                req.extensions_mut().insert(caller);
                Box::pin(self.service.call(req))
            }
            // The downstream service is never called for a rejected request.
            Err(app_err) => Box::pin(ready(Err(app_err.into()))),
        }
    }
}
