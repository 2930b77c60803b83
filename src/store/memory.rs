use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, UnitOfWork};
use crate::models::{Company, Task, User};

#[derive(Debug, Default, Clone)]
struct Tables {
    companies: Vec<Company>,
    users: Vec<User>,
    tasks: Vec<Task>,
}

/// In-process store used by the test suite and by local runs without
/// `DATABASE_URL`.
///
/// A unit of work holds the store lock for its whole lifetime and mutates a
/// private copy of the tables, so transactions are fully serialized and an
/// uncommitted unit of work leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    commit_failure: Arc<StdMutex<Option<StoreError>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next commit fail with a database error. The failed unit of
    /// work is discarded like any other rollback.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit_with(StoreError::Database("commit failed".into()));
    }

    /// Makes the next commit fail with `error`, e.g. a unique violation raised
    /// by a concurrent writer that committed first.
    pub fn fail_next_commit_with(&self, error: StoreError) {
        let mut slot = self
            .commit_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(error);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            commit_failure: self.commit_failure.clone(),
        }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    commit_failure: Arc<StdMutex<Option<StoreError>>>,
}

impl MemoryUnitOfWork {
    fn check_user_constraints(&self, user: &User) -> StoreResult<()> {
        let others = self.working.users.iter().filter(|u| u.id != user.id);
        for other in others {
            if other.email == user.email {
                return Err(StoreError::UniqueViolation("users_email_key".into()));
            }
            if other.username == user.username {
                return Err(StoreError::UniqueViolation("users_username_key".into()));
            }
        }
        if !self.working.companies.iter().any(|c| c.id == user.company_id) {
            return Err(StoreError::ForeignKeyViolation(
                "users_company_id_fkey".into(),
            ));
        }
        Ok(())
    }

    fn check_task_constraints(&self, task: &Task) -> StoreResult<()> {
        if !self.working.users.iter().any(|u| u.id == task.user_id) {
            return Err(StoreError::ForeignKeyViolation("tasks_user_id_fkey".into()));
        }
        Ok(())
    }
}

fn replace<T, F>(rows: &mut [T], matches: F, row: &T)
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    if let Some(slot) = rows.iter_mut().find(|r| matches(r)) {
        *slot = row.clone();
    }
}

fn remove<T, F>(rows: &mut Vec<T>, matches: F) -> u64
where
    F: Fn(&T) -> bool,
{
    let before = rows.len();
    rows.retain(|r| !matches(r));
    (before - rows.len()) as u64
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn list_companies(&mut self) -> StoreResult<Vec<Company>> {
        Ok(self.working.companies.clone())
    }

    async fn find_company(&mut self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.working.companies.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_company(&mut self, company: &Company) -> StoreResult<()> {
        if self.working.companies.iter().any(|c| c.id == company.id) {
            return Err(StoreError::UniqueViolation("companies_pkey".into()));
        }
        self.working.companies.push(company.clone());
        Ok(())
    }

    async fn update_company(&mut self, company: &Company) -> StoreResult<()> {
        replace(&mut self.working.companies, |c| c.id == company.id, company);
        Ok(())
    }

    async fn delete_company(&mut self, id: Uuid) -> StoreResult<u64> {
        if self.working.users.iter().any(|u| u.company_id == id) {
            return Err(StoreError::ForeignKeyViolation(
                "users_company_id_fkey".into(),
            ));
        }
        Ok(remove(&mut self.working.companies, |c| c.id == id))
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        Ok(self.working.users.clone())
    }

    async fn list_users_by_company(&mut self, company_id: Uuid) -> StoreResult<Vec<User>> {
        Ok(self
            .working
            .users
            .iter()
            .filter(|u| u.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .working
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.working.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        if self.working.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::UniqueViolation("users_pkey".into()));
        }
        self.check_user_constraints(user)?;
        self.working.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        self.check_user_constraints(user)?;
        replace(&mut self.working.users, |u| u.id == user.id, user);
        Ok(())
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<u64> {
        if self.working.tasks.iter().any(|t| t.user_id == id) {
            return Err(StoreError::ForeignKeyViolation("tasks_user_id_fkey".into()));
        }
        Ok(remove(&mut self.working.users, |u| u.id == id))
    }

    async fn list_tasks_by_owners(&mut self, owners: &[Uuid]) -> StoreResult<Vec<Task>> {
        Ok(self
            .working
            .tasks
            .iter()
            .filter(|t| owners.contains(&t.user_id))
            .cloned()
            .collect())
    }

    async fn find_task(&mut self, id: Uuid, owner: Option<Uuid>) -> StoreResult<Option<Task>> {
        Ok(self
            .working
            .tasks
            .iter()
            .find(|t| t.id == id && owner.map_or(true, |o| t.user_id == o))
            .cloned())
    }

    async fn count_tasks_by_owner(&mut self, owner: Uuid) -> StoreResult<u64> {
        Ok(self.working.tasks.iter().filter(|t| t.user_id == owner).count() as u64)
    }

    async fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        if self.working.tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::UniqueViolation("tasks_pkey".into()));
        }
        self.check_task_constraints(task)?;
        self.working.tasks.push(task.clone());
        Ok(())
    }

    async fn update_task(&mut self, task: &Task) -> StoreResult<()> {
        self.check_task_constraints(task)?;
        replace(&mut self.working.tasks, |t| t.id == task.id, task);
        Ok(())
    }

    async fn delete_task(&mut self, id: Uuid) -> StoreResult<u64> {
        Ok(remove(&mut self.working.tasks, |t| t.id == id))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork {
            mut guard,
            working,
            commit_failure,
        } = *self;
        let failure = commit_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(error) = failure {
            return Err(error);
        }
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyInput, CompanyMode, UserInput};

    fn company() -> Company {
        Company::new(CompanyInput {
            name: "Acme".to_string(),
            description: None,
            mode: Some(CompanyMode::Public),
            rating: Some(4.0),
        })
    }

    fn user(company_id: Uuid, username: &str, email: &str) -> User {
        User::new(
            UserInput {
                email: email.to_string(),
                username: username.to_string(),
                first_name: "First".to_string(),
                last_name: "Last".to_string(),
                is_active: true,
                is_admin: false,
                company_id,
                password: None,
            },
            "digest".to_string(),
        )
    }

    #[tokio::test]
    async fn test_uncommitted_work_is_discarded() {
        let store = MemoryStore::new();
        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_company(&company()).await.unwrap();
        }
        let mut uow = store.begin().await.unwrap();
        assert!(uow.list_companies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let acme = company();
        let mut uow = store.begin().await.unwrap();
        uow.insert_company(&acme).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.find_company(acme.id).await.unwrap(), Some(acme));
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back() {
        let store = MemoryStore::new();
        store.fail_next_commit();
        let mut uow = store.begin().await.unwrap();
        uow.insert_company(&company()).await.unwrap();
        assert!(uow.commit().await.is_err());

        let mut uow = store.begin().await.unwrap();
        assert!(uow.list_companies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_commit_failure_is_returned_once() {
        let store = MemoryStore::new();
        store.fail_next_commit_with(StoreError::UniqueViolation("companies_pkey".into()));
        let mut uow = store.begin().await.unwrap();
        uow.insert_company(&company()).await.unwrap();
        assert!(matches!(
            uow.commit().await,
            Err(StoreError::UniqueViolation(constraint)) if constraint == "companies_pkey"
        ));

        let mut uow = store.begin().await.unwrap();
        uow.insert_company(&company()).await.unwrap();
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_user_constraints() {
        let store = MemoryStore::new();
        let acme = company();
        let mut uow = store.begin().await.unwrap();
        uow.insert_company(&acme).await.unwrap();
        uow.insert_user(&user(acme.id, "alice", "alice@example.com"))
            .await
            .unwrap();

        let dup_email = user(acme.id, "alice2", "alice@example.com");
        assert!(matches!(
            uow.insert_user(&dup_email).await,
            Err(StoreError::UniqueViolation(_))
        ));
        let dup_name = user(acme.id, "alice", "other@example.com");
        assert!(matches!(
            uow.insert_user(&dup_name).await,
            Err(StoreError::UniqueViolation(_))
        ));
        let dangling = user(Uuid::new_v4(), "bob", "bob@example.com");
        assert!(matches!(
            uow.insert_user(&dangling).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
        assert!(matches!(
            uow.delete_company(acme.id).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
    }
}
