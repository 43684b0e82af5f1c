/// PostgreSQL implementation of the [`Store`] port
///
/// Thin adapter over the model-level SQL. The two composite writes run inside
/// an `sqlx` transaction; dropping the transaction on an early `?` rolls it
/// back.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::models::{
    credential::Credential,
    membership::{CreateMembership, Membership, MembershipFilter, ProjectRole, UpdateMembership},
    project::{CreateProject, Project, ProjectFilter, ReplaceProject, UpdateProject},
    task::{CreateTask, Task, TaskFilter, UpdateTask},
    user::{CreateUser, User},
};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, e.g. for migrations or shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn create_user_with_credential(
        &self,
        user: CreateUser,
        password_hash: String,
    ) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = User::create(&mut *tx, user).await?;
        let credential = Credential::create(&mut *tx, user.id, &password_hash).await?;

        tx.commit().await?;

        debug!(user_id = %user.id, credential_id = %credential.id, "User and credential committed");
        Ok(user)
    }

    async fn find_credential_by_id(&self, id: Uuid) -> StoreResult<Option<Credential>> {
        Ok(Credential::find_by_id(&self.pool, id).await?)
    }

    async fn find_credential_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Credential>> {
        Ok(Credential::find_by_user_id(&self.pool, user_id).await?)
    }

    async fn create_project_with_admin(&self, project: CreateProject) -> StoreResult<Project> {
        let creator = project.created_by;
        let mut tx = self.pool.begin().await?;

        let project = Project::create(&mut *tx, project).await?;
        Membership::create(
            &mut *tx,
            CreateMembership {
                project_id: project.id,
                user_id: creator,
                role: ProjectRole::Admin,
            },
        )
        .await?;

        tx.commit().await?;

        debug!(project_id = %project.id, user_id = %creator, "Project and admin membership committed");
        Ok(project)
    }

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        Ok(Project::list(&self.pool, filter).await?)
    }

    async fn count_projects(&self, filter: &ProjectFilter) -> StoreResult<u64> {
        let count = Project::count(&self.pool, filter).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn update_project(
        &self,
        id: Uuid,
        patch: UpdateProject,
        updated_by: Uuid,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, patch, updated_by).await?)
    }

    async fn update_projects(
        &self,
        filter: &ProjectFilter,
        patch: UpdateProject,
        updated_by: Uuid,
    ) -> StoreResult<u64> {
        Ok(Project::update_all(&self.pool, filter, patch, updated_by).await?)
    }

    async fn replace_project(
        &self,
        id: Uuid,
        data: ReplaceProject,
        updated_by: Uuid,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::replace(&self.pool, id, data, updated_by).await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        Ok(Membership::find(&self.pool, project_id, user_id).await?)
    }

    async fn list_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> StoreResult<Vec<Membership>> {
        Ok(Membership::list_by_project(&self.pool, project_id, filter).await?)
    }

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<Membership> {
        Ok(Membership::create(&self.pool, data).await?)
    }

    async fn update_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
        patch: UpdateMembership,
    ) -> StoreResult<u64> {
        Ok(Membership::update_where(&self.pool, project_id, filter, patch).await?)
    }

    async fn delete_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> StoreResult<u64> {
        Ok(Membership::delete_where(&self.pool, project_id, filter).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, project_id: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id, filter).await?)
    }

    async fn update_task(
        &self,
        id: Uuid,
        patch: UpdateTask,
        updated_by: Uuid,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, patch, updated_by).await?)
    }

    async fn delete_tasks(&self, project_id: Uuid, filter: &TaskFilter) -> StoreResult<u64> {
        Ok(Task::delete_where(&self.pool, project_id, filter).await?)
    }
}
