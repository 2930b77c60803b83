//! User directory: user CRUD plus the email/username uniqueness and
//! company-existence invariants.

use uuid::Uuid;

use super::storage_failure;
use crate::auth::{PasswordHasher, Principal};
use crate::error::AppError;
use crate::models::{User, UserInput};
use crate::store::{Store, StoreError, UnitOfWork};

const MIN_PASSWORD_LEN: usize = 6;

fn not_found() -> AppError {
    AppError::NotFound("The user could not be found".into())
}

fn duplicate_identity() -> AppError {
    AppError::Conflict("The email or username already exist".into())
}

/// Maps a failed insert/update/commit: a unique violation means another
/// request claimed the email or username first.
fn write_failure(context: &'static str) -> impl Fn(StoreError) -> AppError {
    let fail = storage_failure(context);
    move |err| match err {
        StoreError::UniqueViolation(constraint) => {
            log::warn!("{}: lost uniqueness race on {}", context, constraint);
            duplicate_identity()
        }
        other => fail(other),
    }
}

fn checked_password(password: &str) -> Result<&str, AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "password: must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(password)
}

async fn ensure_company(uow: &mut dyn UnitOfWork, company_id: Uuid) -> Result<(), AppError> {
    let company = uow
        .find_company(company_id)
        .await
        .map_err(storage_failure("check company"))?;
    if company.is_none() {
        log::warn!("The company id={} could not be found", company_id);
        return Err(AppError::CompanyNotFound(company_id));
    }
    Ok(())
}

pub async fn list_all(store: &dyn Store) -> Result<Vec<User>, AppError> {
    let fail = storage_failure("list users");
    let mut uow = store.begin().await.map_err(&fail)?;
    uow.list_users().await.map_err(&fail)
}

pub async fn get_by_id(store: &dyn Store, id: Uuid) -> Result<User, AppError> {
    let fail = storage_failure("get user");
    let mut uow = store.begin().await.map_err(&fail)?;
    uow.find_user(id).await.map_err(&fail)?.ok_or_else(not_found)
}

pub async fn list_by_company(store: &dyn Store, company_id: Uuid) -> Result<Vec<User>, AppError> {
    let fail = storage_failure("list users by company");
    let mut uow = store.begin().await.map_err(&fail)?;
    uow.list_users_by_company(company_id).await.map_err(&fail)
}

/// Lists a company's users on behalf of `principal`.
///
/// Only administrators of that same company may enumerate its members.
pub async fn list_for_company(
    store: &dyn Store,
    principal: &Principal,
    company_id: Uuid,
) -> Result<Vec<User>, AppError> {
    if !principal.is_admin || principal.company_id != company_id {
        log::warn!(
            "User {} may not list members of company {}",
            principal.id,
            company_id
        );
        return Err(AppError::Forbidden(
            "You don't have permission to perform this action".into(),
        ));
    }
    list_by_company(store, company_id).await
}

/// Creates a user after checking, in order, that the company exists and
/// that neither the email nor the username is taken. The password is hashed
/// before the unit of work opens.
pub async fn create(
    store: &dyn Store,
    hasher: &PasswordHasher,
    input: UserInput,
) -> Result<User, AppError> {
    let fail = storage_failure("create user");
    let write_fail = write_failure("create user");

    let Some(password) = input.new_password() else {
        return Err(AppError::ValidationError("password: a password is required".into()));
    };
    let password_hash = hasher.hash(checked_password(password)?)?;

    let mut uow = store.begin().await.map_err(&fail)?;
    ensure_company(&mut *uow, input.company_id).await?;

    let email_taken = uow.find_user_by_email(&input.email).await.map_err(&fail)?;
    let username_taken = uow
        .find_user_by_username(&input.username)
        .await
        .map_err(&fail)?;
    if email_taken.is_some() || username_taken.is_some() {
        log::warn!("The username or email already exists");
        return Err(duplicate_identity());
    }

    let user = User::new(input, password_hash);
    uow.insert_user(&user).await.map_err(&write_fail)?;
    uow.commit().await.map_err(&write_fail)?;

    log::info!("Created user {} in company {}", user.id, user.company_id);
    Ok(user)
}

/// Updates a user. Only the identity field that actually changed is checked
/// for collisions (email first, otherwise username); the storage constraint
/// catches anything else.
pub async fn update(
    store: &dyn Store,
    hasher: &PasswordHasher,
    id: Uuid,
    input: UserInput,
) -> Result<User, AppError> {
    let fail = storage_failure("update user");
    let write_fail = write_failure("update user");

    let password_hash = input
        .new_password()
        .map(|p| checked_password(p).and_then(|p| hasher.hash(p)))
        .transpose()?;

    let mut uow = store.begin().await.map_err(&fail)?;
    let Some(mut user) = uow.find_user(id).await.map_err(&fail)? else {
        return Err(not_found());
    };

    if user.company_id != input.company_id {
        ensure_company(&mut *uow, input.company_id).await?;
    }

    if user.email != input.email {
        if uow.find_user_by_email(&input.email).await.map_err(&fail)?.is_some() {
            log::warn!("The email={} exists", input.email);
            return Err(duplicate_identity());
        }
    } else if user.username != input.username
        && uow
            .find_user_by_username(&input.username)
            .await
            .map_err(&fail)?
            .is_some()
    {
        log::warn!("The username={} exists", input.username);
        return Err(duplicate_identity());
    }

    user.apply(input, password_hash);
    uow.update_user(&user).await.map_err(&write_fail)?;
    uow.commit().await.map_err(&write_fail)?;

    log::info!("Updated user {}", user.id);
    Ok(user)
}

/// Deletes a user that owns no tasks.
pub async fn delete(store: &dyn Store, id: Uuid) -> Result<(), AppError> {
    let fail = storage_failure("delete user");
    let mut uow = store.begin().await.map_err(&fail)?;

    if uow.find_user(id).await.map_err(&fail)?.is_none() {
        log::warn!("The user does not exist to delete: {}", id);
        return Err(not_found());
    }
    let owned = uow.count_tasks_by_owner(id).await.map_err(&fail)?;
    if owned > 0 {
        log::warn!("Refusing to delete user {} owning {} task(s)", id, owned);
        return Err(AppError::Conflict(
            "The user still owns tasks and cannot be deleted".into(),
        ));
    }

    match uow.delete_user(id).await {
        Ok(0) => return Err(not_found()),
        Ok(_) => {}
        Err(StoreError::ForeignKeyViolation(_)) => {
            return Err(AppError::Conflict(
                "The user still owns tasks and cannot be deleted".into(),
            ))
        }
        Err(e) => return Err(fail(e)),
    }
    uow.commit().await.map_err(&fail)?;

    log::info!("Deleted user {}", id);
    Ok(())
}
