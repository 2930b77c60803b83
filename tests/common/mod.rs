#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use std::sync::Arc;
use taskledger::auth::{PasswordHasher, TokenKeys, TokenResponse};
use taskledger::models::{Company, CompanyInput, CompanyMode, User, UserInput};
use taskledger::routes;
use taskledger::services::{companies, users};
use taskledger::state::AppState;
use taskledger::store::MemoryStore;

pub const PASSWORD: &str = "Password123!";

pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(4)
}

pub fn app_state(store: &MemoryStore) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(store.clone()),
        hasher(),
        TokenKeys::from_secret(b"integration-test-secret"),
        Duration::minutes(10),
    ))
}

pub async fn init_app(
    store: &MemoryStore,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(app_state(store))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub async fn seed_company(store: &MemoryStore, name: &str) -> Company {
    companies::create(
        store,
        CompanyInput {
            name: name.to_string(),
            description: None,
            mode: Some(CompanyMode::Private),
            rating: None,
        },
    )
    .await
    .expect("seed company")
}

pub async fn seed_user(
    store: &MemoryStore,
    company_id: uuid::Uuid,
    username: &str,
    admin: bool,
) -> User {
    users::create(
        store,
        &hasher(),
        UserInput {
            email: format!("{}@example.com", username),
            username: username.to_string(),
            first_name: username.to_string(),
            last_name: String::new(),
            is_active: true,
            is_admin: admin,
            company_id,
            password: Some(PASSWORD.to_string()),
        },
    )
    .await
    .expect("seed user")
}

/// Logs in through `/auth/token` and returns the access token.
pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/auth/token")
        .set_form([("username", username), ("password", PASSWORD)])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "login failed for {}", username);
    let body: TokenResponse = test::read_body_json(resp).await;
    body.access_token
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
