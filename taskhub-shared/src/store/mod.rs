/// Persistence port
///
/// Services never talk to a database directly; they receive an
/// `Arc<dyn Store>` and call the narrow operations below. Two implementations
/// are provided:
///
/// - [`postgres::PgStore`]: production store backed by a `PgPool`, delegating
///   to the SQL in [`crate::models`]
/// - [`memory::MemoryStore`]: in-process store with the same uniqueness,
///   cascade and ordering semantics, used by tests and local development
///
/// # Transactions
///
/// The two multi-entity writes of the system are single operations on the
/// port, so each implementation can make them atomic with its own mechanism:
///
/// - [`Store::create_user_with_credential`]: User + Credential
/// - [`Store::create_project_with_admin`]: Project + creator's ADMIN membership
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskhub_shared::store::{memory::MemoryStore, Store};
///
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    credential::Credential,
    membership::{CreateMembership, Membership, MembershipFilter, UpdateMembership},
    project::{CreateProject, Project, ProjectFilter, ReplaceProject, UpdateProject},
    task::{CreateTask, Task, TaskFilter, UpdateTask},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique or foreign key constraint was violated; carries the constraint name
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                if let Some(constraint) = db_err.constraint() {
                    return StoreError::Conflict(constraint.to_string());
                }
            }
        }
        tracing::warn!(error = %err, "Database operation failed");
        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations consumed by the services
#[async_trait]
pub trait Store: Send + Sync {
    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    // Users and credentials

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Creates a user and its credential atomically
    ///
    /// Either both rows exist afterwards or neither does.
    async fn create_user_with_credential(
        &self,
        user: CreateUser,
        password_hash: String,
    ) -> StoreResult<User>;

    async fn find_credential_by_id(&self, id: Uuid) -> StoreResult<Option<Credential>>;

    async fn find_credential_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Credential>>;

    // Projects

    /// Creates a project and the creator's ADMIN membership atomically
    async fn create_project_with_admin(&self, project: CreateProject) -> StoreResult<Project>;

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>>;

    async fn count_projects(&self, filter: &ProjectFilter) -> StoreResult<u64>;

    async fn update_project(
        &self,
        id: Uuid,
        patch: UpdateProject,
        updated_by: Uuid,
    ) -> StoreResult<Option<Project>>;

    async fn update_projects(
        &self,
        filter: &ProjectFilter,
        patch: UpdateProject,
        updated_by: Uuid,
    ) -> StoreResult<u64>;

    async fn replace_project(
        &self,
        id: Uuid,
        data: ReplaceProject,
        updated_by: Uuid,
    ) -> StoreResult<Option<Project>>;

    /// Deletes a project with its tasks and memberships
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    // Memberships

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>>;

    async fn list_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> StoreResult<Vec<Membership>>;

    /// Fails with [`StoreError::Conflict`] if the user is already a member
    async fn create_membership(&self, data: CreateMembership) -> StoreResult<Membership>;

    async fn update_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
        patch: UpdateMembership,
    ) -> StoreResult<u64>;

    async fn delete_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> StoreResult<u64>;

    // Tasks

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;

    async fn list_tasks(&self, project_id: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    async fn update_task(
        &self,
        id: Uuid,
        patch: UpdateTask,
        updated_by: Uuid,
    ) -> StoreResult<Option<Task>>;

    async fn delete_tasks(&self, project_id: Uuid, filter: &TaskFilter) -> StoreResult<u64>;
}
