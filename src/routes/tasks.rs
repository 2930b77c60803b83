use crate::{
    auth::Principal,
    error::AppError,
    models::TaskInput,
    services::tasks,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves the tasks visible to the authenticated user.
///
/// Administrators receive every task owned by a member of their company;
/// other users receive only their own tasks.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects, oldest first.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::list_for_principal(state.store(), &principal).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `summary`: 1 to 200 characters (required).
/// - `description` (optional): up to 1000 characters.
/// - `status` (optional): `NEW`, `INP` or `CMP`. Defaults to `NEW`.
/// - `priority` (optional): `CRT`, `HIG`, `MED` or `LOW`. Defaults to `MED`.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task`.
/// - `404 Not Found`: The authenticated user no longer exists.
/// - `422 Unprocessable Entity`: If input validation on `TaskInput` fails.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    principal: Principal,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = tasks::create(state.store(), task_data.into_inner(), &principal).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `404 Not Found`: No such task, or a non-admin asked for a task they do not own.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    principal: Principal,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_by_id(state.store(), task_id.into_inner(), &principal).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Overwrites a task. The task becomes owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task`.
/// - `403 Forbidden`: A non-admin targeted a task they do not own (or that does not exist).
/// - `404 Not Found`: An admin targeted a missing task.
/// - `422 Unprocessable Entity`: If input validation on `TaskInput` fails.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    principal: Principal,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = tasks::update(
        state.store(),
        task_id.into_inner(),
        task_data.into_inner(),
        &principal,
    )
    .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: A non-admin targeted a task they do not own (or that does not exist).
/// - `404 Not Found`: An admin targeted a missing task.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    principal: Principal,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    tasks::delete(state.store(), task_id.into_inner(), &principal).await?;
    Ok(HttpResponse::NoContent().finish())
}
