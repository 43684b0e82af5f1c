/// In-memory implementation of the [`Store`] port
///
/// Mirrors the Postgres schema's guarantees so that services behave the same
/// against either store:
///
/// - unique `users.email`, `user_credentials.user_id` and
///   `(project_users.user_id, project_users.project_id)`
/// - foreign keys on memberships, credentials and tasks
/// - `ON DELETE CASCADE` from projects to tasks and memberships, and
///   `ON DELETE SET NULL` for `tasks.linked_to`
/// - insertion order for listings (the SQL orders by `created_at`)
///
/// Every operation holds the lock for its whole duration, which makes the
/// composite writes atomic.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    credential::Credential,
    membership::{CreateMembership, Membership, MembershipFilter, ProjectRole, UpdateMembership},
    project::{CreateProject, Project, ProjectFilter, ReplaceProject, UpdateProject},
    task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    credentials: Vec<Credential>,
    projects: Vec<Project>,
    memberships: Vec<Membership>,
    tasks: Vec<Task>,
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn project_exists(&self, id: Uuid) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    fn task_exists(&self, id: Uuid) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    fn insert_user(&mut self, data: CreateUser) -> StoreResult<User> {
        if self.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    fn insert_membership(&mut self, data: CreateMembership) -> StoreResult<Membership> {
        if !self.project_exists(data.project_id) {
            return Err(StoreError::Conflict("project_users_project_id_fkey".to_string()));
        }
        if !self.user_exists(data.user_id) {
            return Err(StoreError::Conflict("project_users_user_id_fkey".to_string()));
        }
        if self
            .memberships
            .iter()
            .any(|m| m.project_id == data.project_id && m.user_id == data.user_id)
        {
            return Err(StoreError::Conflict(
                "project_users_user_project_key".to_string(),
            ));
        }

        let membership = Membership {
            id: Uuid::new_v4(),
            role: data.role,
            project_id: data.project_id,
            user_id: data.user_id,
            created_at: Utc::now(),
        };
        self.memberships.push(membership.clone());
        Ok(membership)
    }

    /// Removes tasks matching `doomed` and clears dangling `linked_to` references
    fn remove_tasks(&mut self, doomed: impl Fn(&Task) -> bool) -> u64 {
        let before = self.tasks.len();
        let mut removed = Vec::new();
        self.tasks.retain(|t| {
            if doomed(t) {
                removed.push(t.id);
                false
            } else {
                true
            }
        });

        for task in self.tasks.iter_mut() {
            if task.linked_to.is_some_and(|id| removed.contains(&id)) {
                task.linked_to = None;
            }
        }

        (before - self.tasks.len()) as u64
    }
}

fn paginate<T: Clone>(items: Vec<&T>, limit: Option<u32>, offset: Option<u32>) -> Vec<T> {
    let offset = offset.map_or(0, |o| o as usize);
    let limit = limit.map_or(usize::MAX, |l| l as usize);

    items.into_iter().skip(offset).take(limit).cloned().collect()
}

/// Store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user_with_credential(
        &self,
        user: CreateUser,
        password_hash: String,
    ) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        let user = tables.insert_user(user)?;
        tables.credentials.push(Credential {
            id: Uuid::new_v4(),
            password_hash,
            user_id: user.id,
            created_at: Utc::now(),
        });

        Ok(user)
    }

    async fn find_credential_by_id(&self, id: Uuid) -> StoreResult<Option<Credential>> {
        let tables = self.tables.read().await;
        Ok(tables.credentials.iter().find(|c| c.id == id).cloned())
    }

    async fn find_credential_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Credential>> {
        let tables = self.tables.read().await;
        Ok(tables
            .credentials
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn create_project_with_admin(&self, data: CreateProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;

        if !tables.user_exists(data.created_by) {
            return Err(StoreError::Conflict("projects_created_by_fkey".to_string()));
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            created_at: now,
            updated_at: now,
            created_by: Some(data.created_by),
            updated_by: Some(data.created_by),
        };
        tables.projects.push(project.clone());

        if let Err(e) = tables.insert_membership(CreateMembership {
            project_id: project.id,
            user_id: data.created_by,
            role: ProjectRole::Admin,
        }) {
            tables.projects.retain(|p| p.id != project.id);
            return Err(e);
        }

        Ok(project)
    }

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let matching = tables.projects.iter().filter(|p| filter.matches(p)).collect();
        Ok(paginate(matching, filter.limit, filter.offset))
    }

    async fn count_projects(&self, filter: &ProjectFilter) -> StoreResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update_project(
        &self,
        id: Uuid,
        patch: UpdateProject,
        updated_by: Uuid,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;

        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        apply_project_patch(project, &patch, updated_by);
        Ok(Some(project.clone()))
    }

    async fn update_projects(
        &self,
        filter: &ProjectFilter,
        patch: UpdateProject,
        updated_by: Uuid,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;

        let mut count = 0;
        for project in tables.projects.iter_mut().filter(|p| filter.matches(p)) {
            apply_project_patch(project, &patch, updated_by);
            count += 1;
        }
        Ok(count)
    }

    async fn replace_project(
        &self,
        id: Uuid,
        data: ReplaceProject,
        updated_by: Uuid,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;

        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.title = data.title;
        project.description = data.description;
        project.updated_by = Some(updated_by);
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if !tables.project_exists(id) {
            return Ok(false);
        }

        tables.projects.retain(|p| p.id != id);
        tables.memberships.retain(|m| m.project_id != id);
        tables.remove_tasks(|t| t.project_id == id);
        Ok(true)
    }

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> StoreResult<Vec<Membership>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.project_id == project_id && filter.matches(m))
            .cloned()
            .collect())
    }

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<Membership> {
        let mut tables = self.tables.write().await;
        tables.insert_membership(data)
    }

    async fn update_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
        patch: UpdateMembership,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;

        let mut count = 0;
        for membership in tables
            .memberships
            .iter_mut()
            .filter(|m| m.project_id == project_id && filter.matches(m))
        {
            if let Some(role) = patch.role {
                membership.role = role;
            }
            count += 1;
        }
        Ok(count)
    }

    async fn delete_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;

        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|m| !(m.project_id == project_id && filter.matches(m)));
        Ok((before - tables.memberships.len()) as u64)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.project_exists(data.project_id) {
            return Err(StoreError::Conflict("tasks_project_id_fkey".to_string()));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            status: TaskStatus::Todo,
            description: data.description,
            created_at: now,
            updated_at: now,
            is_created_by_admin: data.is_created_by_admin,
            project_id: data.project_id,
            assigned_to: None,
            linked_to: None,
            created_by: Some(data.created_by),
            updated_by: Some(data.created_by),
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, project_id: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let matching = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id && filter.matches(t))
            .collect();
        Ok(paginate(matching, filter.limit, filter.offset))
    }

    async fn update_task(
        &self,
        id: Uuid,
        patch: UpdateTask,
        updated_by: Uuid,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        if let Some(assignee) = patch.assigned_to {
            if !tables.user_exists(assignee) {
                return Err(StoreError::Conflict("tasks_assigned_to_fkey".to_string()));
            }
        }
        if let Some(linked) = patch.linked_to {
            if !tables.task_exists(linked) {
                return Err(StoreError::Conflict("tasks_linked_to_fkey".to_string()));
            }
        }

        let Some(task) = tables.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(assignee) = patch.assigned_to {
            task.assigned_to = Some(assignee);
        }
        if let Some(linked) = patch.linked_to {
            task.linked_to = Some(linked);
        }
        task.updated_by = Some(updated_by);
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_tasks(&self, project_id: Uuid, filter: &TaskFilter) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_tasks(|t| t.project_id == project_id && filter.matches(t)))
    }
}

fn apply_project_patch(project: &mut Project, patch: &UpdateProject, updated_by: Uuid) {
    if let Some(ref title) = patch.title {
        project.title = title.clone();
    }
    if let Some(ref description) = patch.description {
        project.description = Some(description.clone());
    }
    project.updated_by = Some(updated_by);
    project.updated_at = Utc::now();
}
