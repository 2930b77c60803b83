//! Company directory. Companies are not owned by principals, so nothing here
//! filters by caller.

use uuid::Uuid;

use super::storage_failure;
use crate::error::AppError;
use crate::models::{Company, CompanyInput};
use crate::store::{Store, StoreError};

fn not_found() -> AppError {
    AppError::NotFound("Company not found".into())
}

pub async fn list_all(store: &dyn Store) -> Result<Vec<Company>, AppError> {
    let fail = storage_failure("list companies");
    let mut uow = store.begin().await.map_err(&fail)?;
    uow.list_companies().await.map_err(&fail)
}

pub async fn get_by_id(store: &dyn Store, id: Uuid) -> Result<Company, AppError> {
    let fail = storage_failure("get company");
    let mut uow = store.begin().await.map_err(&fail)?;
    uow.find_company(id).await.map_err(&fail)?.ok_or_else(not_found)
}

pub async fn create(store: &dyn Store, input: CompanyInput) -> Result<Company, AppError> {
    let fail = storage_failure("create company");
    let company = Company::new(input);

    let mut uow = store.begin().await.map_err(&fail)?;
    uow.insert_company(&company).await.map_err(&fail)?;
    uow.commit().await.map_err(&fail)?;

    log::info!("Created company {}", company.id);
    Ok(company)
}

pub async fn update(store: &dyn Store, id: Uuid, input: CompanyInput) -> Result<Company, AppError> {
    let fail = storage_failure("update company");
    let mut uow = store.begin().await.map_err(&fail)?;

    let Some(mut company) = uow.find_company(id).await.map_err(&fail)? else {
        log::warn!("The company to update does not exist: {}", id);
        return Err(AppError::NotFound(
            "The company could not be found to update".into(),
        ));
    };
    company.apply(input);
    uow.update_company(&company).await.map_err(&fail)?;
    uow.commit().await.map_err(&fail)?;

    log::info!("Updated company {}", company.id);
    Ok(company)
}

/// Deletes a company that no user references any more.
pub async fn delete(store: &dyn Store, id: Uuid) -> Result<(), AppError> {
    let fail = storage_failure("delete company");
    let mut uow = store.begin().await.map_err(&fail)?;

    if uow.find_company(id).await.map_err(&fail)?.is_none() {
        return Err(not_found());
    }
    let members = uow.list_users_by_company(id).await.map_err(&fail)?;
    if !members.is_empty() {
        log::warn!(
            "Refusing to delete company {} with {} user(s)",
            id,
            members.len()
        );
        return Err(AppError::Conflict(
            "The company still has users and cannot be deleted".into(),
        ));
    }

    match uow.delete_company(id).await {
        Ok(0) => return Err(not_found()),
        Ok(_) => {}
        // A user was attached between the check and the delete.
        Err(StoreError::ForeignKeyViolation(_)) => {
            return Err(AppError::Conflict(
                "The company still has users and cannot be deleted".into(),
            ))
        }
        Err(e) => return Err(fail(e)),
    }
    uow.commit().await.map_err(&fail)?;

    log::info!("Deleted company {}", id);
    Ok(())
}
