use crate::{auth::CallerId, error::AppError, models::ProfileChanges, services::ProfileService};
use actix_web::{get, put, web, HttpResponse, Responder};
use validator::Validate;

/// Returns the authenticated user's profile.
///
/// `404 Not Found` when no profile row exists yet (for example on first login).
#[get("/me")]
pub async fn get_me(
    service: web::Data<ProfileService>,
    caller: CallerId,
) -> Result<impl Responder, AppError> {
    let profile = service.get(&caller).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Updates `name` and/or `avatar_url` on the authenticated user's profile.
#[put("/me")]
pub async fn update_me(
    service: web::Data<ProfileService>,
    caller: CallerId,
    profile_data: web::Json<ProfileChanges>,
) -> Result<impl Responder, AppError> {
    profile_data.validate()?;

    let profile = service.update(&caller, profile_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}
