use crate::{
    auth::Principal, error::AppError, models::UserInput, services::users, state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists every user. Password digests are never serialized.
#[get("")]
pub async fn list_users(
    state: web::Data<AppState>,
    _principal: Principal,
) -> Result<impl Responder, AppError> {
    let users = users::list_all(state.store()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Creates a user in an existing company.
///
/// ## Responses:
/// - `201 Created`: The new `User`.
/// - `404 Not Found`: `company_id` does not resolve.
/// - `409 Conflict`: Email or username already taken.
/// - `422 Unprocessable Entity`: Input validation failed or no password given.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    _principal: Principal,
    user_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;
    let user = users::create(state.store(), &state.hasher, user_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Lists the members of one company. Only an admin of that company may ask.
#[get("/company/{company_id}")]
pub async fn list_company_users(
    state: web::Data<AppState>,
    principal: Principal,
    company_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let users = users::list_for_company(state.store(), &principal, company_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    _principal: Principal,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = users::get_by_id(state.store(), user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Replaces a user's profile. An empty or missing `password` keeps the
/// current one.
///
/// ## Responses:
/// - `200 OK`: The updated `User`.
/// - `404 Not Found`: No such user, or the new `company_id` does not resolve.
/// - `409 Conflict`: The new email or username belongs to someone else.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    _principal: Principal,
    user_id: web::Path<Uuid>,
    user_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;
    let user = users::update(
        state.store(),
        &state.hasher,
        user_id.into_inner(),
        user_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Deletes a user.
///
/// ## Responses:
/// - `204 No Content`: Deleted.
/// - `404 Not Found`: No such user.
/// - `409 Conflict`: The user still owns tasks.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    _principal: Principal,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    users::delete(state.store(), user_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
