//! Directories and the task ledger.
//!
//! Each public operation opens one unit of work on the store it is handed,
//! performs all of its checks and writes inside it, and commits only when
//! every step succeeded. Storage failures are logged here, at the boundary,
//! and leave as `AppError`.

pub mod bootstrap;
pub mod companies;
pub mod tasks;
pub mod users;

use crate::error::AppError;
use crate::store::StoreError;

/// Logs a storage failure under `context` and converts it for the caller.
pub(crate) fn storage_failure(context: &'static str) -> impl Fn(StoreError) -> AppError {
    move |err| {
        match &err {
            StoreError::UniqueViolation(_) | StoreError::ForeignKeyViolation(_) => {
                log::warn!("{}: {}", context, err)
            }
            _ => log::error!("{}: {}", context, err),
        }
        AppError::from(err)
    }
}
