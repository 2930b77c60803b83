use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// A user account.
///
/// The password digest is never serialized outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Input for creating or updating a user.
///
/// `password` is required on create. On update it is optional and an empty
/// string leaves the stored digest untouched.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UserInput {
    #[validate(email)]
    pub email: String,
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[serde(alias = "user_name")]
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    pub company_id: Uuid,
    pub password: Option<String>,
}

impl UserInput {
    /// The password to (re)hash, if one was supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

impl User {
    pub fn new(input: UserInput, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: input.email,
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            password_hash,
            is_active: input.is_active,
            is_admin: input.is_admin,
            company_id: input.company_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Overwrites profile fields. The digest is replaced only when
    /// `password_hash` is given.
    pub fn apply(&mut self, input: UserInput, password_hash: Option<String>) {
        self.email = input.email;
        self.username = input.username;
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.is_active = input.is_active;
        self.is_admin = input.is_admin;
        self.company_id = input.company_id;
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        self.updated_at = Some(Utc::now());
    }
}
