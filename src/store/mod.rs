//!
//! # Storage
//!
//! Every directory operation runs inside one [`UnitOfWork`] obtained from a
//! [`Store`]. A unit of work sees its own writes, publishes them only on
//! [`UnitOfWork::commit`], and is rolled back when dropped uncommitted.
//!
//! Both backends enforce the same constraints: unique `users.email` and
//! `users.username`, and non-cascading foreign keys from users to companies
//! and from tasks to users. These constraints are the final arbiter when two
//! requests race past the directory-level checks.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Company, Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("stored row could not be decoded: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let Some(db_error) = error.as_database_error() {
            let constraint = db_error.constraint().unwrap_or("unnamed").to_string();
            if db_error.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_error.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        match error {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(error.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A storage engine capable of opening transactional units of work.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}

/// One transaction against the store.
///
/// `delete_*` methods return the number of rows removed.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn list_companies(&mut self) -> StoreResult<Vec<Company>>;
    async fn find_company(&mut self, id: Uuid) -> StoreResult<Option<Company>>;
    async fn insert_company(&mut self, company: &Company) -> StoreResult<()>;
    async fn update_company(&mut self, company: &Company) -> StoreResult<()>;
    async fn delete_company(&mut self, id: Uuid) -> StoreResult<u64>;

    async fn list_users(&mut self) -> StoreResult<Vec<User>>;
    async fn list_users_by_company(&mut self, company_id: Uuid) -> StoreResult<Vec<User>>;
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&mut self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&mut self, user: &User) -> StoreResult<()>;
    async fn update_user(&mut self, user: &User) -> StoreResult<()>;
    async fn delete_user(&mut self, id: Uuid) -> StoreResult<u64>;

    async fn list_tasks_by_owners(&mut self, owners: &[Uuid]) -> StoreResult<Vec<Task>>;
    /// Looks a task up by id, optionally restricted to one owner.
    async fn find_task(&mut self, id: Uuid, owner: Option<Uuid>) -> StoreResult<Option<Task>>;
    async fn count_tasks_by_owner(&mut self, owner: Uuid) -> StoreResult<u64>;
    async fn insert_task(&mut self, task: &Task) -> StoreResult<()>;
    async fn update_task(&mut self, task: &Task) -> StoreResult<()>;
    async fn delete_task(&mut self, id: Uuid) -> StoreResult<u64>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
