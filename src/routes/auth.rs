use crate::{
    auth::{authenticate, issue_token, TokenRequest, TokenResponse},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Exchange credentials for a bearer token
///
/// Accepts the OAuth2 password-flow form (`username`, `password`) or the same
/// fields as JSON.
#[post("/token")]
pub async fn token(
    state: web::Data<AppState>,
    credentials: web::Either<web::Form<TokenRequest>, web::Json<TokenRequest>>,
) -> Result<impl Responder, AppError> {
    let credentials = match credentials {
        web::Either::Left(form) => form.into_inner(),
        web::Either::Right(json) => json.into_inner(),
    };
    credentials.validate()?;

    let principal = authenticate(
        state.store(),
        &state.hasher,
        &credentials.username,
        &credentials.password,
    )
    .await?;
    let (access_token, expire_in) = issue_token(&state.tokens, &principal, state.token_ttl)?;

    log::info!("Issued token for user {}", principal.id);
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token, expire_in)))
}
