use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;

use tasknest::auth::AuthGate;
use tasknest::config::Config;
use tasknest::routes::{self, health};
use tasknest::services::{ProfileService, TaskService};
use tasknest::store::PgStore;
use tasknest::translate::ErrorTranslator;

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    let store = PgStore::connect(&config).await.map_err(startup_error)?;
    if config.run_migrations {
        log::info!("Running database migrations");
        sqlx::migrate!()
            .run(store.pool())
            .await
            .map_err(startup_error)?;
    }

    let store = Arc::new(store);
    let tasks = web::Data::new(TaskService::new(store.clone()));
    let profiles = web::Data::new(ProfileService::new(store));

    if config.auth.jwt_secret.is_none() {
        log::warn!("JWT_SECRET is not set; every /api request will fail with 500");
    }

    let auth = config.auth.clone();
    let stage = config.stage;

    log::info!(
        "Starting tasknest ({} stage) at {}",
        stage,
        config.server_url()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(tasks.clone())
            .app_data(profiles.clone())
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
                    .wrap(AuthGate::new(auth.clone()))
                    .configure(routes::config)
                    .default_service(web::to(routes::not_found)),
            )
            .default_service(web::to(routes::not_found))
    })
    .bind((config.server_host.clone(), config.server_port))?
    .run()
    .await
}
