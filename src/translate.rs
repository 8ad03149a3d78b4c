//!
//! # Response Translation
//!
//! `ErrorTranslator` wraps the whole application. Typed failures (`AppError`)
//! already know their status and body and pass through untouched. Anything else
//! that reaches this boundary (an error type the crate does not own, or a panic
//! inside a handler) is a defect: it is logged in full and replaced with an
//! `AppError::Internal` whose message depends on the deployment stage.
//!
//! This is the only place where the stage decides what a client may see.

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse, ResponseError,
};
use futures::future::{ready, FutureExt, LocalBoxFuture, Ready};
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::config::Stage;
use crate::error::AppError;

/// Message returned for unexpected failures outside local/development stages.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Converts a failure the crate could not classify into a response.
pub fn untyped_failure(detail: &str, stage: Stage) -> HttpResponse {
    log::error!("Unhandled error reached the response boundary: {}", detail);

    let message = if stage.discloses_internal_errors() {
        detail.to_owned()
    } else {
        INTERNAL_SERVER_ERROR.to_owned()
    };
    AppError::Internal(message).error_response()
}

fn translate_error(err: &Error, stage: Stage) -> HttpResponse {
    match err.as_error::<AppError>() {
        Some(app_err) => app_err.error_response(),
        None => untyped_failure(&err.to_string(), stage),
    }
}

fn translate_response<B>(res: ServiceResponse<B>, stage: Stage) -> ServiceResponse<BoxBody>
where
    B: MessageBody + 'static,
{
    let untyped = res
        .response()
        .error()
        .filter(|err| err.as_error::<AppError>().is_none())
        .map(|err| err.to_string());

    match untyped {
        Some(detail) => {
            let (req, _) = res.into_parts();
            ServiceResponse::new(req, untyped_failure(&detail, stage))
        }
        None => res.map_into_boxed_body(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_owned()
    }
}

pub struct ErrorTranslator {
    stage: Stage,
}

impl ErrorTranslator {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorTranslator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = ErrorTranslatorService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorTranslatorService {
            service,
            stage: self.stage,
        }))
    }
}

pub struct ErrorTranslatorService<S> {
    service: S,
    stage: Stage,
}

impl<S, B> Service<ServiceRequest> for ErrorTranslatorService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let stage = self.stage;
        let http_req = req.request().clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(res)) => Ok(translate_response(res, stage)),
                Ok(Err(err)) => Ok(ServiceResponse::new(http_req, translate_error(&err, stage))),
                Err(payload) => {
                    let detail = panic_message(payload.as_ref());
                    Ok(ServiceResponse::new(http_req, untyped_failure(&detail, stage)))
                }
            }
        })
    }
}
