use crate::{error::AppError, models::CompanyInput, services::companies, state::AppState};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists every company.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Company` objects, oldest first.
#[get("")]
pub async fn list_companies(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let companies = companies::list_all(state.store()).await?;
    Ok(HttpResponse::Ok().json(companies))
}

/// Creates a company.
///
/// ## Responses:
/// - `201 Created`: The new `Company`.
/// - `422 Unprocessable Entity`: Name shorter than 3 characters or rating outside 1..=5.
#[post("")]
pub async fn create_company(
    state: web::Data<AppState>,
    company_data: web::Json<CompanyInput>,
) -> Result<impl Responder, AppError> {
    company_data.validate()?;
    let company = companies::create(state.store(), company_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(company))
}

#[get("/{id}")]
pub async fn get_company(
    state: web::Data<AppState>,
    company_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let company = companies::get_by_id(state.store(), company_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(company))
}

/// Replaces a company's mutable fields.
///
/// ## Responses:
/// - `200 OK`: The updated `Company`.
/// - `404 Not Found`: No company with that id.
/// - `422 Unprocessable Entity`: Input validation failed.
#[put("/{id}")]
pub async fn update_company(
    state: web::Data<AppState>,
    company_id: web::Path<Uuid>,
    company_data: web::Json<CompanyInput>,
) -> Result<impl Responder, AppError> {
    company_data.validate()?;
    let company = companies::update(
        state.store(),
        company_id.into_inner(),
        company_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(company))
}

/// Deletes a company.
///
/// ## Responses:
/// - `204 No Content`: Deleted.
/// - `404 Not Found`: No company with that id.
/// - `409 Conflict`: Users still belong to the company.
#[delete("/{id}")]
pub async fn delete_company(
    state: web::Data<AppState>,
    company_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    companies::delete(state.store(), company_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use crate::models::{CompanyInput, CompanyMode};
    use validator::Validate;

    #[test]
    fn test_company_input_validation() {
        let valid = CompanyInput {
            name: "Acme".to_string(),
            description: None,
            mode: Some(CompanyMode::Public),
            rating: Some(5.0),
        };
        assert!(valid.validate().is_ok());

        let short_name = CompanyInput {
            name: "Ac".to_string(),
            description: None,
            mode: Some(CompanyMode::Public),
            rating: None,
        };
        assert!(short_name.validate().is_err());

        for rating in [0.0, 5.5] {
            let out_of_range = CompanyInput {
                name: "Acme".to_string(),
                description: None,
                mode: Some(CompanyMode::Private),
                rating: Some(rating),
            };
            assert!(out_of_range.validate().is_err(), "rating {}", rating);
        }
    }
}
