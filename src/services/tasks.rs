//! Task ledger: task CRUD with ownership-aware access rules.
//!
//! Administrators address any task by id alone, system-wide. Everyone else
//! only ever sees or touches tasks they own. Listing is the one place admin
//! visibility is narrowed, to the tasks of the admin's own company.

use uuid::Uuid;

use super::{storage_failure, users};
use crate::auth::Principal;
use crate::error::AppError;
use crate::models::{Task, TaskInput};
use crate::store::{Store, UnitOfWork};

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

fn forbidden() -> AppError {
    AppError::Forbidden("You don't have permission to perform this action".into())
}

/// Owner filter applied to lookups made on behalf of `principal`.
fn owner_scope(principal: &Principal) -> Option<Uuid> {
    if principal.is_admin {
        None
    } else {
        Some(principal.id)
    }
}

/// Finds the task a mutation targets.
///
/// A non-admin cannot tell "not yours" from "does not exist" and gets
/// `Forbidden` for both; an admin miss is a plain `NotFound`.
async fn find_target(
    uow: &mut dyn UnitOfWork,
    id: Uuid,
    principal: &Principal,
    context: &'static str,
) -> Result<Task, AppError> {
    let task = uow
        .find_task(id, owner_scope(principal))
        .await
        .map_err(storage_failure(context))?;
    match task {
        Some(task) => Ok(task),
        None if principal.is_admin => {
            log::warn!("{}: task {} does not exist", context, id);
            Err(not_found())
        }
        None => {
            log::warn!("{}: user {} may not act on task {}", context, principal.id, id);
            Err(forbidden())
        }
    }
}

async fn ensure_principal_exists(
    uow: &mut dyn UnitOfWork,
    principal: &Principal,
    context: &'static str,
) -> Result<(), AppError> {
    let user = uow
        .find_user(principal.id)
        .await
        .map_err(storage_failure(context))?;
    if user.is_none() {
        log::error!("{}: the user id = {} could not be found", context, principal.id);
        return Err(AppError::OwnerNotFound(principal.id));
    }
    Ok(())
}

/// Admins get every task owned by a member of their company; everyone else
/// gets their own tasks.
pub async fn list_for_principal(
    store: &dyn Store,
    principal: &Principal,
) -> Result<Vec<Task>, AppError> {
    let owners: Vec<Uuid> = if principal.is_admin {
        users::list_by_company(store, principal.company_id)
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect()
    } else {
        vec![principal.id]
    };

    let fail = storage_failure("list tasks");
    let mut uow = store.begin().await.map_err(&fail)?;
    uow.list_tasks_by_owners(&owners).await.map_err(&fail)
}

pub async fn get_by_id(store: &dyn Store, id: Uuid, principal: &Principal) -> Result<Task, AppError> {
    let fail = storage_failure("get task");
    let mut uow = store.begin().await.map_err(&fail)?;
    uow.find_task(id, owner_scope(principal))
        .await
        .map_err(&fail)?
        .ok_or_else(not_found)
}

/// Creates a task owned by `principal`.
pub async fn create(
    store: &dyn Store,
    input: TaskInput,
    principal: &Principal,
) -> Result<Task, AppError> {
    let fail = storage_failure("create task");
    let mut uow = store.begin().await.map_err(&fail)?;
    ensure_principal_exists(&mut *uow, principal, "create task").await?;

    let task = Task::new(input, principal.id);
    uow.insert_task(&task).await.map_err(&fail)?;
    uow.commit().await.map_err(&fail)?;

    log::info!("Created task {} for user {}", task.id, principal.id);
    Ok(task)
}

/// Overwrites a task's fields. The task is reassigned to `principal`.
pub async fn update(
    store: &dyn Store,
    id: Uuid,
    input: TaskInput,
    principal: &Principal,
) -> Result<Task, AppError> {
    let fail = storage_failure("update task");
    let mut uow = store.begin().await.map_err(&fail)?;
    ensure_principal_exists(&mut *uow, principal, "update task").await?;

    let mut task = find_target(&mut *uow, id, principal, "update task").await?;
    let previous_owner = task.user_id;
    task.apply(input, principal.id);
    uow.update_task(&task).await.map_err(&fail)?;
    uow.commit().await.map_err(&fail)?;

    if previous_owner != principal.id {
        log::info!(
            "Task {} reassigned from user {} to user {}",
            task.id,
            previous_owner,
            principal.id
        );
    }
    log::info!("Updated task {}", task.id);
    Ok(task)
}

pub async fn delete(store: &dyn Store, id: Uuid, principal: &Principal) -> Result<(), AppError> {
    let fail = storage_failure("delete task");
    let mut uow = store.begin().await.map_err(&fail)?;

    let task = find_target(&mut *uow, id, principal, "delete task").await?;
    if uow.delete_task(task.id).await.map_err(&fail)? == 0 {
        return Err(not_found());
    }
    uow.commit().await.map_err(&fail)?;

    log::info!("Deleted task {}", id);
    Ok(())
}
