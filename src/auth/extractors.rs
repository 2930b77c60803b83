use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use super::identity::Principal;
use crate::error::AppError;

/// Extracts the `Principal` that `AuthMiddleware` placed in the request
/// extensions.
///
/// On a route the middleware does not cover this fails with 401.
impl FromRequest for Principal {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Principal>().cloned() {
            Some(principal) => ready(Ok(principal)),
            None => {
                log::warn!("No principal on {}; is AuthMiddleware mounted?", req.path());
                ready(Err(AppError::Unauthenticated("Not authenticated".into()).into()))
            }
        }
    }
}
