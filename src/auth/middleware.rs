use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::identity::{resolve, Principal};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves the bearer token of every request in the wrapped scope and
/// stores the resulting `Principal` in the request extensions.
///
/// Requests without a usable token are answered with 401 here and never
/// reach the handler.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Returns the token of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

fn authorize(req: &ServiceRequest) -> Result<Principal, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        log::error!("AuthMiddleware is mounted without AppState");
        return Err(AppError::InternalServerError(
            "Application state is not configured".into(),
        ));
    };
    let Some(token) = bearer_token(req) else {
        log::debug!("No bearer token on {} {}", req.method(), req.path());
        return Err(AppError::Unauthenticated("Not authenticated".into()));
    };
    resolve(&state.tokens, token)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authorize(&req) {
            Ok(principal) => {
                req.extensions_mut().insert(principal);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                let response = req
                    .into_response(err.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHasher, TokenKeys};
    use crate::store::MemoryStore;
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use chrono::Duration;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn whoami(principal: Principal) -> HttpResponse {
        HttpResponse::Ok().json(principal)
    }

    fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryStore::new()),
            PasswordHasher::new(4),
            TokenKeys::from_secret(b"middleware-test"),
            Duration::minutes(10),
        )
    }

    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: String::new(),
            is_admin: false,
            is_active: true,
            company_id: Uuid::new_v4(),
        }
    }

    #[actix_rt::test]
    async fn test_valid_token_reaches_handler() {
        let state = state();
        let alice = principal();
        let (token, _) = state
            .tokens
            .issue(alice.to_claims(), Duration::minutes(5))
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/me").wrap(AuthMiddleware).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], alice.id.to_string());
    }

    #[actix_rt::test]
    async fn test_rejected_requests_get_401() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(web::scope("/me").wrap(AuthMiddleware).route("", web::get().to(whoami))),
        )
        .await;

        let headers = [None, Some("Bearer"), Some("Basic abc"), Some("Bearer not-a-jwt")];
        for value in headers {
            let mut req = test::TestRequest::get().uri("/me");
            if let Some(value) = value {
                req = req.insert_header((header::AUTHORIZATION, value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header {:?}", value);
            assert_eq!(
                resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
        }
    }
}
