use chrono::{DateTime, Duration, Utc};

use super::identity::Principal;
use super::password::PasswordHasher;
use super::token::TokenKeys;
use crate::error::AppError;
use crate::services::storage_failure;
use crate::store::Store;

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 10;

fn auth_failure() -> AppError {
    AppError::Unauthenticated("Invalid username or password".into())
}

/// Verifies `username` / `password` against the stored digest.
///
/// Unknown usernames, wrong passwords, unreadable digests and inactive
/// accounts all produce the same error.
pub async fn authenticate(
    store: &dyn Store,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<Principal, AppError> {
    let mut uow = store
        .begin()
        .await
        .map_err(storage_failure("authenticate"))?;
    let user = uow
        .find_user_by_username(username)
        .await
        .map_err(storage_failure("authenticate"))?;
    drop(uow);

    let Some(user) = user else {
        log::info!("Login rejected: unknown username");
        return Err(auth_failure());
    };

    match hasher.verify(password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            log::info!("Login rejected for user {}: bad password", user.id);
            return Err(auth_failure());
        }
        Err(e) => {
            log::warn!("Login rejected for user {}: {}", user.id, e);
            return Err(auth_failure());
        }
    }

    if !user.is_active {
        log::info!("Login rejected for user {}: account inactive", user.id);
        return Err(auth_failure());
    }

    Ok(Principal::from(&user))
}

/// Mints a signed token for `principal`, valid for `ttl`.
pub fn issue_token(
    keys: &TokenKeys,
    principal: &Principal,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>), AppError> {
    Ok(keys.issue(principal.to_claims(), ttl)?)
}
