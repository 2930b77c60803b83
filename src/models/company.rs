use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::UnknownCode;

/// Visibility mode of a company, persisted as `PUB` / `PRV`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompanyMode {
    #[default]
    #[serde(rename = "PUB", alias = "PUBLIC")]
    Public,
    #[serde(rename = "PRV", alias = "PRIVATE")]
    Private,
}

impl CompanyMode {
    pub fn as_code(&self) -> &'static str {
        match self {
            CompanyMode::Public => "PUB",
            CompanyMode::Private => "PRV",
        }
    }
}

impl TryFrom<String> for CompanyMode {
    type Error = UnknownCode;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        match code.as_str() {
            "PUB" => Ok(CompanyMode::Public),
            "PRV" => Ok(CompanyMode::Private),
            _ => Err(UnknownCode::new("company mode", code)),
        }
    }
}

/// Input for creating or updating a company.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CompanyInput {
    /// Company name, at least 3 characters.
    #[validate(length(min = 3, max = 200))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Public when omitted on create; left unchanged when omitted on update.
    #[serde(default)]
    pub mode: Option<CompanyMode>,

    /// Rating between 1 and 5 inclusive.
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: Option<f64>,
}

/// A company as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub mode: CompanyMode,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    /// Unset until the first modification.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Company {
    pub fn new(input: CompanyInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            mode: input.mode.unwrap_or_default(),
            rating: input.rating,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn apply(&mut self, input: CompanyInput) {
        self.name = input.name;
        self.description = input.description;
        if let Some(mode) = input.mode {
            self.mode = mode;
        }
        self.rating = input.rating;
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, rating: Option<f64>) -> CompanyInput {
        CompanyInput {
            name: name.to_string(),
            description: None,
            mode: None,
            rating,
        }
    }

    #[test]
    fn test_company_input_validation() {
        assert!(input("Acme", Some(4.0)).validate().is_ok());
        assert!(input("Acme", None).validate().is_ok());
        assert!(input("Ac", Some(4.0)).validate().is_err());
        assert!(input("Acme", Some(0.0)).validate().is_err());
        assert!(input("Acme", Some(6.0)).validate().is_err());
    }

    #[test]
    fn test_apply_sets_updated_at() {
        let mut company = Company::new(input("Acme", Some(4.0)));
        assert!(company.updated_at.is_none());

        company.apply(input("Acme", Some(2.0)));
        assert_eq!(company.rating, Some(2.0));
        assert!(company.updated_at.is_some());
    }

    #[test]
    fn test_mode_defaults_to_public_and_survives_updates() {
        let mut company = Company::new(input("Acme", Some(4.0)));
        assert_eq!(company.mode, CompanyMode::Public);

        company.apply(CompanyInput {
            mode: Some(CompanyMode::Private),
            ..input("Acme", Some(4.0))
        });
        assert_eq!(company.mode, CompanyMode::Private);

        company.apply(input("Acme", Some(2.0)));
        assert_eq!(company.mode, CompanyMode::Private);
    }

    #[test]
    fn test_mode_codes() {
        let mode: CompanyMode = serde_json::from_str("\"PUBLIC\"").unwrap();
        assert_eq!(mode, CompanyMode::Public);
        assert_eq!(serde_json::to_string(&CompanyMode::Private).unwrap(), "\"PRV\"");
        assert_eq!(CompanyMode::try_from("PUB".to_string()).unwrap().as_code(), "PUB");
    }
}
