use serde::Serialize;
use uuid::Uuid;

use super::token::{Claims, TokenKeys};
use crate::error::AppError;
use crate::models::User;

/// The authenticated identity behind one request.
///
/// Built from verified token claims and never written back to storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub company_id: Uuid,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_admin: user.is_admin,
            is_active: user.is_active,
            company_id: user.company_id,
        }
    }
}

impl Principal {
    /// Claims for this principal; `exp` is filled in at issuance.
    pub fn to_claims(&self) -> Claims {
        Claims {
            sub: self.username.clone(),
            id: self.id.to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_admin: self.is_admin,
            is_active: self.is_active,
            company_id: self.company_id.to_string(),
            exp: 0,
        }
    }
}

fn unauthenticated() -> AppError {
    AppError::Unauthenticated("Could not validate credentials".into())
}

/// Resolves a bearer token into a trusted `Principal`.
///
/// Every failure (bad signature, expiry, missing or malformed claim, inactive
/// account) yields the same `Unauthenticated` error. The cause is only logged.
pub fn resolve(keys: &TokenKeys, token: &str) -> Result<Principal, AppError> {
    let claims = keys.verify(token).map_err(|e| {
        log::debug!("Rejected bearer token: {}", e);
        unauthenticated()
    })?;

    let (Ok(id), Ok(company_id)) = (
        Uuid::parse_str(&claims.id),
        Uuid::parse_str(&claims.company_id),
    ) else {
        log::debug!("Rejected bearer token: malformed id or company_id claim");
        return Err(unauthenticated());
    };

    if claims.sub.is_empty() {
        log::debug!("Rejected bearer token: empty subject");
        return Err(unauthenticated());
    }
    if !claims.is_active {
        log::debug!("Rejected bearer token for inactive user {}", id);
        return Err(unauthenticated());
    }

    Ok(Principal {
        id,
        username: claims.sub,
        first_name: claims.first_name,
        last_name: claims.last_name,
        is_admin: claims.is_admin,
        is_active: claims.is_active,
        company_id,
    })
}
