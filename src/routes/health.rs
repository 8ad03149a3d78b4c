use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness check for load balancers and orchestrators.
///
/// Mounted outside `/api`: it needs no bearer token and never touches the
/// store, so it answers even when `JWT_SECRET` is missing or the database is
/// unreachable.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
