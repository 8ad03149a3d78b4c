use crate::{
    auth::CallerId,
    error::AppError,
    models::{NewTask, TaskChanges, TaskList},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists the authenticated user's tasks.
///
/// Tasks are ordered by creation date in descending order.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [Task, ...]}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn list_tasks(
    service: web::Data<TaskService>,
    caller: CallerId,
) -> Result<impl Responder, AppError> {
    let tasks = service.list(&caller).await?;
    Ok(HttpResponse::Ok().json(TaskList { tasks }))
}

/// Creates a new task for the authenticated user.
///
/// The `user_id` of the task is always the authenticated user; any owner in
/// the body is ignored.
///
/// ## Request Body:
/// - `title`: 1 to 200 characters (required).
/// - `description` (optional): up to 2000 characters.
/// - `status` (optional): `todo` (default), `inprogress` or `done`.
/// - `priority` (optional): `low`, `medium` (default) or `high`.
/// - `due_date` (optional): RFC 3339 timestamp.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task`.
/// - `400 Bad Request`: If the body is malformed or fails validation.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[post("")]
pub async fn create_task(
    service: web::Data<TaskService>,
    caller: CallerId,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = service.create(&caller, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task`.
/// - `400 Bad Request`: If `id` is not a UUID.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the task does not exist or is not owned by the caller.
#[get("/{id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    caller: CallerId,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = service.get(&caller, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task the caller owns.
///
/// Only the fields present in the body are changed; `updated_at` always
/// advances.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task`.
/// - `400 Bad Request`: Bad id or invalid body.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the task does not exist or is not owned by the caller.
#[put("/{id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    caller: CallerId,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskChanges>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = service
        .update(&caller, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the caller owns.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the task does not exist or is not owned by the caller.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    caller: CallerId,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    service.delete(&caller, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
