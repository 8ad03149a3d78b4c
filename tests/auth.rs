mod common;

use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use pretty_assertions::assert_eq;
use std::net::TcpListener;
use std::time::Duration;
use std::sync::Arc;

use common::{bearer, expired_token_for, foreign_token_for, init_app, token_for, SECRET};
use tasknest::auth::AuthGate;
use tasknest::config::{AuthConfig, Stage};
use tasknest::error::ErrorBody;
use tasknest::routes::{self, health};
use tasknest::services::{ProfileService, TaskService};
use tasknest::store::MemoryStore;
use tasknest::translate::ErrorTranslator;

const UNAUTHORIZED_BODY: &str = r#"{"message":"Unauthorized"}"#;

#[actix_rt::test]
async fn test_missing_authorization_header_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app(store.clone(), AuthConfig::with_secret(SECRET), Stage::Production).await;

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(test::read_body(resp).await, UNAUTHORIZED_BODY);
    assert_eq!(store.calls(), 0, "no handler may run for an unauthenticated request");
}

#[actix_rt::test]
async fn test_non_bearer_scheme_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app(store.clone(), AuthConfig::with_secret(SECRET), Stage::Production).await;

    for value in [
        format!("Basic {}", token_for("u1")),
        format!("bearer {}", token_for("u1")),
        token_for("u1"),
        "Bearer".to_string(),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header((header::AUTHORIZATION, value.clone()))
            .set_json(serde_json::json!({ "title": "Should never exist" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header: {}", value);
    }

    assert_eq!(store.calls(), 0);
    assert!(store.all_tasks().is_empty());
}

#[test_log::test(actix_rt::test)]
async fn test_bad_tokens_share_one_response() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app(store.clone(), AuthConfig::with_secret(SECRET), Stage::Local).await;

    for token in [
        expired_token_for("u1"),
        foreign_token_for("u1"),
        "definitely.not.ajwt".to_string(),
        "garbage".to_string(),
    ] {
        let req = test::TestRequest::get()
            .uri("/api/users/me")
            .append_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        // The reason (expired, bad signature, malformed) stays in the logs.
        assert_eq!(test::read_body(resp).await, UNAUTHORIZED_BODY);
    }

    assert_eq!(store.calls(), 0);
}

#[actix_rt::test]
async fn test_subject_must_be_a_non_empty_string() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let store = Arc::new(MemoryStore::new());
    let app = init_app(store.clone(), AuthConfig::with_secret(SECRET), Stage::Production).await;
    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();

    for claims in [
        serde_json::json!({ "exp": exp }),
        serde_json::json!({ "sub": "", "exp": exp }),
        serde_json::json!({ "sub": 42, "exp": exp }),
    ] {
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let req = test::TestRequest::get()
            .uri("/api/tasks")
            .append_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "claims: {}", claims);
    }

    assert_eq!(store.calls(), 0);
}

#[actix_rt::test]
async fn test_missing_secret_is_a_server_error() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app(store.clone(), AuthConfig::default(), Stage::Production).await;

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(bearer(&token_for("u1")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.message, "Authentication is not configured");
    assert_eq!(store.calls(), 0);
}

#[actix_rt::test]
async fn test_valid_token_reaches_handler() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app(store.clone(), AuthConfig::with_secret(SECRET), Stage::Production).await;

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(bearer(&token_for("u1")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "tasks": [] }));
    assert_eq!(store.calls(), 1);
}

#[actix_rt::test]
async fn test_audience_is_enforced_when_configured() {
    let store = Arc::new(MemoryStore::new());
    let auth = AuthConfig {
        jwt_secret: Some(SECRET.to_string()),
        jwt_audience: Some("authenticated".to_string()),
    };
    let app = init_app(store, auth, Stage::Production).await;

    // token_for() carries no audience claim.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(bearer(&token_for("u1")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_health_is_public() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app(store, AuthConfig::default(), Stage::Production).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_unauthorized_over_the_wire() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let store = Arc::new(MemoryStore::new());
    let tasks = web::Data::new(TaskService::new(store.clone()));
    let profiles = web::Data::new(ProfileService::new(store.clone()));
    let auth = AuthConfig::with_secret(SECRET);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(tasks.clone())
            .app_data(profiles.clone())
            .wrap(ErrorTranslator::new(Stage::Production))
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthGate::new(auth.clone()))
                    .configure(routes::config),
            )
    })
    .listen(listener)
    .expect("Failed to listen on test port")
    .workers(1)
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let request = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&serde_json::json!({ "title": "Unauthorized Task" }))
        .send();
    let resp = tokio::time::timeout(Duration::from_secs(5), request)
        .await
        .expect("Server did not answer in time")
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    let body: ErrorBody = resp.json().await.expect("Body was not an error envelope");
    assert_eq!(body.message, "Unauthorized");
    assert_eq!(store.calls(), 0);

    handle.stop(true).await;
}
