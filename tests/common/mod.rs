#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{http::header, test, web, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;

use tasknest::auth::AuthGate;
use tasknest::config::{AuthConfig, Stage};
use tasknest::routes::{self, health};
use tasknest::services::{ProfileService, TaskService};
use tasknest::store::MemoryStore;
use tasknest::translate::ErrorTranslator;

pub const SECRET: &str = "integration_test_secret";

fn sign(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

fn expiry(hours: i64) -> i64 {
    (chrono::Utc::now() + chrono::Duration::hours(hours)).timestamp()
}

/// A valid token for `sub`, signed with [`SECRET`].
pub fn token_for(sub: &str) -> String {
    sign(json!({ "sub": sub, "exp": expiry(1) }), SECRET)
}

pub fn expired_token_for(sub: &str) -> String {
    sign(json!({ "sub": sub, "exp": expiry(-2) }), SECRET)
}

pub fn foreign_token_for(sub: &str) -> String {
    sign(json!({ "sub": sub, "exp": expiry(1) }), "someone_elses_secret")
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Builds the application exactly as `main.rs` does, on top of `store`.
pub async fn init_app(
    store: Arc<MemoryStore>,
    auth: AuthConfig,
    stage: Stage,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let tasks = web::Data::new(TaskService::new(store.clone()));
    let profiles = web::Data::new(ProfileService::new(store));

    test::init_service(
        App::new()
            .app_data(tasks)
            .app_data(profiles)
            .wrap(ErrorTranslator::new(stage))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthGate::new(auth))
                    .configure(routes::config)
                    .default_service(web::to(routes::not_found)),
            )
            .default_service(web::to(routes::not_found)),
    )
    .await
}

