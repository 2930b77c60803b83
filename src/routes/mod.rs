pub mod auth;
pub mod companies;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

fn bad_request(err: impl std::fmt::Display, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected request to {}: {}", req.path(), err);
    AppError::BadRequest(err.to_string()).into()
}

/// Registers every route. `/health`, `/auth` and `/companies` are public;
/// `/users` and `/tasks` sit behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, req| {
        bad_request(err, req)
    }))
    .app_data(web::FormConfig::default().error_handler(|err: error::UrlencodedError, req| {
        bad_request(err, req)
    }))
    .app_data(web::PathConfig::default().error_handler(|err: error::PathError, req| {
        bad_request(err, req)
    }))
    .service(health::health)
    .service(web::scope("/auth").service(auth::token))
    .service(
        web::scope("/companies")
            .service(companies::list_companies)
            .service(companies::create_company)
            .service(companies::get_company)
            .service(companies::update_company)
            .service(companies::delete_company),
    )
    .service(
        web::scope("/users")
            .wrap(AuthMiddleware)
            .service(users::list_users)
            .service(users::create_user)
            .service(users::list_company_users)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
