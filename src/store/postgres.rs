use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{PgPool, Transaction};
use uuid::Uuid;

use super::{Store, StoreResult, UnitOfWork};
use crate::models::{Company, Task, User};

const COMPANY_COLUMNS: &str = "id, name, description, mode, rating, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash, \
     is_active, is_admin, company_id, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, summary, description, status, priority, user_id, created_at, updated_at";

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies the embedded migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Database migrations applied");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Wraps one database transaction. Dropping it without `commit` rolls back.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn list_companies(&mut self) -> StoreResult<Vec<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY created_at");
        Ok(sqlx::query_as::<_, Company>(&sql)
            .fetch_all(&mut *self.tx)
            .await?)
    }

    async fn find_company(&mut self, id: Uuid) -> StoreResult<Option<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1");
        Ok(sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn insert_company(&mut self, company: &Company) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO companies (id, name, description, mode, rating, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.mode.as_code())
        .bind(company.rating)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_company(&mut self, company: &Company) -> StoreResult<()> {
        sqlx::query(
            "UPDATE companies
             SET name = $2, description = $3, mode = $4, rating = $5, updated_at = $6
             WHERE id = $1",
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.mode.as_code())
        .bind(company.rating)
        .bind(company.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_company(&mut self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        Ok(sqlx::query_as::<_, User>(&sql)
            .fetch_all(&mut *self.tx)
            .await?)
    }

    async fn list_users_by_company(&mut self, company_id: Uuid) -> StoreResult<Vec<User>> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users WHERE company_id = $1 ORDER BY created_at");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(company_id)
            .fetch_all(&mut *self.tx)
            .await?)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn find_user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, username, first_name, last_name, password_hash,
                                is_active, is_admin, company_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.company_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users
             SET email = $2, username = $3, first_name = $4, last_name = $5,
                 password_hash = $6, is_active = $7, is_admin = $8, company_id = $9,
                 updated_at = $10
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.company_id)
        .bind(user.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_tasks_by_owners(&mut self, owners: &[Uuid]) -> StoreResult<Vec<Task>> {
        let sql =
            format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ANY($1) ORDER BY created_at");
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(owners)
            .fetch_all(&mut *self.tx)
            .await?)
    }

    async fn find_task(&mut self, id: Uuid, owner: Option<Uuid>) -> StoreResult<Option<Task>> {
        let task = match owner {
            Some(owner) => {
                let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
                sqlx::query_as::<_, Task>(&sql)
                    .bind(id)
                    .bind(owner)
                    .fetch_optional(&mut *self.tx)
                    .await?
            }
            None => {
                let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
                sqlx::query_as::<_, Task>(&sql)
                    .bind(id)
                    .fetch_optional(&mut *self.tx)
                    .await?
            }
        };
        Ok(task)
    }

    async fn count_tasks_by_owner(&mut self, owner: Uuid) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count as u64)
    }

    async fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, summary, description, status, priority, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(task.id)
        .bind(&task.summary)
        .bind(&task.description)
        .bind(task.status.as_code())
        .bind(task.priority.as_code())
        .bind(task.user_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_task(&mut self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            "UPDATE tasks
             SET summary = $2, description = $3, status = $4, priority = $5,
                 user_id = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(task.id)
        .bind(&task.summary)
        .bind(&task.description)
        .bind(task.status.as_code())
        .bind(task.priority.as_code())
        .bind(task.user_id)
        .bind(task.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_task(&mut self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
