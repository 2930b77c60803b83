//! First-run seeding of an administrator account.

use validator::Validate;

use super::{companies, storage_failure, users};
use crate::auth::PasswordHasher;
use crate::config::BootstrapAdmin;
use crate::error::AppError;
use crate::models::{CompanyInput, CompanyMode, User, UserInput};
use crate::store::Store;

/// Creates the configured admin, and a company for it, unless a user with
/// that username already exists. Returns the user that was created.
pub async fn ensure_admin(
    store: &dyn Store,
    hasher: &PasswordHasher,
    admin: &BootstrapAdmin,
) -> Result<Option<User>, AppError> {
    let existing = {
        let fail = storage_failure("bootstrap admin");
        let mut uow = store.begin().await.map_err(&fail)?;
        uow.find_user_by_username(&admin.username)
            .await
            .map_err(&fail)?
    };
    if existing.is_some() {
        log::info!("Bootstrap admin '{}' already exists", admin.username);
        return Ok(None);
    }

    let mut input = UserInput {
        email: admin.email.clone(),
        username: admin.username.clone(),
        first_name: admin.username.clone(),
        last_name: String::new(),
        is_active: true,
        is_admin: true,
        company_id: uuid::Uuid::nil(),
        password: Some(admin.password.clone()),
    };
    input.validate()?;

    let company = companies::create(
        store,
        CompanyInput {
            name: admin.company_name.clone(),
            description: None,
            mode: Some(CompanyMode::Private),
            rating: None,
        },
    )
    .await?;

    input.company_id = company.id;
    let user = users::create(store, hasher, input).await?;

    log::info!(
        "Bootstrapped admin '{}' in company {}",
        user.username,
        company.id
    );
    Ok(Some(user))
}
