pub mod authenticator;
pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use authenticator::{authenticate, issue_token, DEFAULT_TOKEN_TTL_MINUTES};
pub use identity::{resolve, Principal};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenKeys};

/// Credentials posted to `/auth/token`, either form-encoded or as JSON.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed JWT to send back as `Authorization: Bearer <token>`.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Expiry instant of `access_token`.
    pub expire_in: DateTime<Utc>,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expire_in: DateTime<Utc>) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expire_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_token_request_validation() {
        let valid = TokenRequest {
            username: "alice".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_username = TokenRequest {
            username: String::new(),
            password: "password123".to_string(),
        };
        assert!(empty_username.validate().is_err());

        let empty_password = TokenRequest {
            username: "alice".to_string(),
            password: String::new(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_token_response_shape() {
        let expiry = Utc::now();
        let body = serde_json::to_value(TokenResponse::bearer("abc".to_string(), expiry)).unwrap();
        assert_eq!(body["access_token"], "abc");
        assert_eq!(body["token_type"], "bearer");
        assert!(body["expire_in"].is_string());
    }
}
