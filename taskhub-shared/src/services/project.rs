/// Project CRUD
///
/// Creation is the only guarded-by-construction operation: the creator becomes
/// the project's first ADMIN in the same transaction. Reads, updates and
/// deletes by project id do not consult membership at all.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::project::{
    CreateProject, NewProject, Project, ProjectFilter, ReplaceProject, UpdateProject,
};
use crate::models::user::User;
use crate::store::Store;

fn project_not_found() -> ServiceError {
    ServiceError::NotFound("project not found".to_string())
}

/// Project service
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a project owned by `creator_id`
    ///
    /// The creator is stamped as `created_by`/`updated_by` and receives an
    /// ADMIN membership atomically with the project row.
    pub async fn create_project(&self, creator_id: Uuid, input: NewProject) -> ServiceResult<Project> {
        let project = self
            .store
            .create_project_with_admin(CreateProject {
                title: input.title,
                description: input.description,
                created_by: creator_id,
            })
            .await?;

        info!(project_id = %project.id, created_by = %creator_id, "Project created");

        Ok(project)
    }

    pub async fn find_projects(&self, filter: &ProjectFilter) -> ServiceResult<Vec<Project>> {
        Ok(self.store.list_projects(filter).await?)
    }

    pub async fn find_project_by_id(&self, id: Uuid) -> ServiceResult<Project> {
        self.store
            .find_project_by_id(id)
            .await?
            .ok_or_else(project_not_found)
    }

    pub async fn count_projects(&self, filter: &ProjectFilter) -> ServiceResult<u64> {
        Ok(self.store.count_projects(filter).await?)
    }

    /// Applies a partial update and stamps the caller as updater
    pub async fn update_project(
        &self,
        id: Uuid,
        patch: UpdateProject,
        caller_id: Uuid,
    ) -> ServiceResult<Project> {
        let project = self
            .store
            .update_project(id, patch, caller_id)
            .await?
            .ok_or_else(project_not_found)?;

        info!(project_id = %id, updated_by = %caller_id, "Project updated");

        Ok(project)
    }

    /// Applies a partial update to every project matching `filter`
    ///
    /// Returns the number of projects updated.
    pub async fn update_projects(
        &self,
        filter: &ProjectFilter,
        patch: UpdateProject,
        caller_id: Uuid,
    ) -> ServiceResult<u64> {
        let count = self.store.update_projects(filter, patch, caller_id).await?;

        info!(count, updated_by = %caller_id, "Projects updated");

        Ok(count)
    }

    pub async fn replace_project(
        &self,
        id: Uuid,
        data: ReplaceProject,
        caller_id: Uuid,
    ) -> ServiceResult<Project> {
        let project = self
            .store
            .replace_project(id, data, caller_id)
            .await?
            .ok_or_else(project_not_found)?;

        info!(project_id = %id, updated_by = %caller_id, "Project replaced");

        Ok(project)
    }

    /// Deletes a project together with its tasks and memberships
    pub async fn delete_project(&self, id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_project(id).await? {
            return Err(project_not_found());
        }

        info!(project_id = %id, "Project deleted");

        Ok(())
    }

    /// Returns the user who last updated the project
    ///
    /// # Errors
    ///
    /// `NotFound` if the project does not exist or has no updater
    pub async fn project_updater(&self, id: Uuid) -> ServiceResult<User> {
        let project = self.find_project_by_id(id).await?;

        let updater = project
            .updated_by
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

        self.store
            .find_user_by_id(updater)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))
    }
}
