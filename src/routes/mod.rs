pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::AppError;

/// Registers the authenticated API. Mounted under `/api` behind `AuthGate`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/users")
                .service(users::get_me)
                .service(users::update_me),
        );
}

/// Body rejections (bad JSON, wrong types, missing fields) become `BadRequest`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}

/// Path rejections (for example a task id that is not a UUID) become `BadRequest`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Not Found".into()))
}
