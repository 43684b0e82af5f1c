/// Role-scoped task operations
///
/// # Visibility
///
/// Admins see every task the filter selects. For any other member the filter
/// is narrowed to `is_created_by_admin = false`, whatever the caller asked for.
///
/// # Assignment
///
/// Only admins may set `assigned_to`, and only to an existing user.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskhub_shared::models::task::{NewTask, TaskFilter};
/// use taskhub_shared::services::task::TaskService;
/// use taskhub_shared::store::Store;
/// use uuid::Uuid;
///
/// # async fn example(store: Arc<dyn Store>, user_id: Uuid, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let tasks = TaskService::new(store);
///
/// let task = tasks.create_task(user_id, project_id, NewTask {
///     title: "Write release notes".to_string(),
///     description: None,
/// }).await?;
///
/// let visible = tasks.list_tasks(user_id, project_id, TaskFilter::default()).await?;
/// assert!(visible.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, require_membership, ProjectAction};
use crate::models::task::{CreateTask, NewTask, Task, TaskFilter, UpdateTask};
use crate::store::Store;

/// Task service
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Lists the tasks of a project visible to the caller
    ///
    /// # Errors
    ///
    /// `NotAuthorized` if the caller is not a member of the project
    pub async fn list_tasks(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        mut filter: TaskFilter,
    ) -> ServiceResult<Vec<Task>> {
        let membership =
            authorize(self.store.as_ref(), caller_id, project_id, ProjectAction::ListTasks).await?;

        if !ProjectAction::ViewAdminTasks.permits(membership.role) {
            filter.is_created_by_admin = Some(false);
        }

        Ok(self.store.list_tasks(project_id, &filter).await?)
    }

    /// Creates a task in the project on behalf of a member
    ///
    /// The task starts in `TODO`, records the caller as creator and updater,
    /// and remembers whether the caller was an admin at this moment.
    pub async fn create_task(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        input: NewTask,
    ) -> ServiceResult<Task> {
        let membership =
            authorize(self.store.as_ref(), caller_id, project_id, ProjectAction::CreateTask).await?;

        let task = self
            .store
            .create_task(CreateTask {
                title: input.title,
                description: input.description,
                project_id,
                is_created_by_admin: membership.role.is_admin(),
                created_by: caller_id,
            })
            .await?;

        info!(
            task_id = %task.id,
            %project_id,
            created_by = %caller_id,
            is_created_by_admin = task.is_created_by_admin,
            "Task created"
        );

        Ok(task)
    }

    /// Patches a task by ID
    ///
    /// The caller must be a member of `project_id`, but the patch itself is
    /// applied by task ID alone.
    ///
    /// # Errors
    ///
    /// - `NotAuthorized` if the caller is not a member of the project
    /// - `Forbidden("Not allow to assign task")` if a non-admin sets `assigned_to`
    /// - `NotFound("User assigned to is no valid")` for an unknown assignee
    /// - `NotFound` for an unknown `linked_to` task or task ID
    pub async fn patch_task(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        task_id: Uuid,
        patch: UpdateTask,
    ) -> ServiceResult<Task> {
        let membership = require_membership(self.store.as_ref(), caller_id, project_id).await?;

        if let Some(assignee) = patch.assigned_to {
            if !ProjectAction::AssignTask.permits(membership.role) {
                return Err(ServiceError::Forbidden("Not allow to assign task".to_string()));
            }
            if self.store.find_user_by_id(assignee).await?.is_none() {
                return Err(ServiceError::NotFound("User assigned to is no valid".to_string()));
            }
        }

        if let Some(linked) = patch.linked_to {
            if self.store.find_task_by_id(linked).await?.is_none() {
                return Err(ServiceError::NotFound("linked task not found".to_string()));
            }
        }

        let task = self
            .store
            .update_task(task_id, patch, caller_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("task not found".to_string()))?;

        info!(%task_id, updated_by = %caller_id, "Task updated");

        Ok(task)
    }

    /// Deletes every task of the project matching `filter`
    pub async fn delete_tasks(&self, project_id: Uuid, filter: &TaskFilter) -> ServiceResult<u64> {
        let count = self.store.delete_tasks(project_id, filter).await?;

        info!(%project_id, count, "Tasks deleted");

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::{CreateMembership, ProjectRole};
    use crate::models::project::CreateProject;
    use crate::models::task::TaskStatus;
    use crate::models::user::CreateUser;
    use crate::store::memory::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: TaskService,
        project_id: Uuid,
        admin: Uuid,
        member: Uuid,
        outsider: Uuid,
    }

    async fn user(store: &MemoryStore, email: &str) -> Uuid {
        store
            .create_user_with_credential(
                CreateUser {
                    email: email.to_string(),
                    name: None,
                },
                "hash".to_string(),
            )
            .await
            .unwrap()
            .id
    }

    async fn setup() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let admin = user(&store, "alice@example.com").await;
        let member = user(&store, "bob@example.com").await;
        let outsider = user(&store, "carol@example.com").await;

        let project = store
            .create_project_with_admin(CreateProject {
                title: "Roadmap".to_string(),
                description: None,
                created_by: admin,
            })
            .await
            .unwrap();
        store
            .create_membership(CreateMembership {
                project_id: project.id,
                user_id: member,
                role: ProjectRole::Member,
            })
            .await
            .unwrap();

        Fixture {
            service: TaskService::new(store.clone()),
            store,
            project_id: project.id,
            admin,
            member,
            outsider,
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_visibility_scenario() {
        let f = setup().await;

        let t = f
            .service
            .create_task(f.member, f.project_id, new_task("T"))
            .await
            .unwrap();
        assert!(!t.is_created_by_admin);
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.created_by, Some(f.member));

        let seen = f
            .service
            .list_tasks(f.member, f.project_id, TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(seen.iter().map(|t| t.id).collect::<Vec<_>>(), vec![t.id]);

        let t2 = f
            .service
            .create_task(f.admin, f.project_id, new_task("T2"))
            .await
            .unwrap();
        assert!(t2.is_created_by_admin);

        let member_view = f
            .service
            .list_tasks(f.member, f.project_id, TaskFilter::default())
            .await
            .unwrap();
        assert!(member_view.iter().all(|t| !t.is_created_by_admin));
        assert!(!member_view.iter().any(|t| t.id == t2.id));

        let admin_view = f
            .service
            .list_tasks(f.admin, f.project_id, TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(admin_view.len(), 2);
    }

    #[tokio::test]
    async fn test_member_cannot_widen_visibility() {
        let f = setup().await;
        f.service
            .create_task(f.admin, f.project_id, new_task("Admin only"))
            .await
            .unwrap();

        let filter = TaskFilter {
            is_created_by_admin: Some(true),
            ..Default::default()
        };
        let seen = f.service.list_tasks(f.member, f.project_id, filter).await.unwrap();
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_outsider_not_authorized() {
        let f = setup().await;

        let list = f
            .service
            .list_tasks(f.outsider, f.project_id, TaskFilter::default())
            .await;
        assert!(matches!(list, Err(ServiceError::NotAuthorized)));

        let create = f
            .service
            .create_task(f.outsider, f.project_id, new_task("Sneaky"))
            .await;
        assert!(matches!(create, Err(ServiceError::NotAuthorized)));
    }

    #[tokio::test]
    async fn test_member_cannot_assign() {
        let f = setup().await;
        let task = f
            .service
            .create_task(f.member, f.project_id, new_task("T"))
            .await
            .unwrap();

        let err = f
            .service
            .patch_task(
                f.member,
                f.project_id,
                task.id,
                UpdateTask {
                    assigned_to: Some(f.member),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(ref m) if m == "Not allow to assign task"));

        let unchanged = f.store.find_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(unchanged.assigned_to, None);
    }

    #[tokio::test]
    async fn test_admin_assigns_existing_user_only() {
        let f = setup().await;
        let task = f
            .service
            .create_task(f.member, f.project_id, new_task("T"))
            .await
            .unwrap();

        let err = f
            .service
            .patch_task(
                f.admin,
                f.project_id,
                task.id,
                UpdateTask {
                    assigned_to: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "User assigned to is no valid"));

        let patched = f
            .service
            .patch_task(
                f.admin,
                f.project_id,
                task.id,
                UpdateTask {
                    assigned_to: Some(f.member),
                    status: Some(TaskStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.assigned_to, Some(f.member));
        assert_eq!(patched.status, TaskStatus::InProgress);
        assert_eq!(patched.updated_by, Some(f.admin));
        assert!(!patched.is_created_by_admin);
    }

    #[tokio::test]
    async fn test_member_patches_without_assignment() {
        let f = setup().await;
        let first = f
            .service
            .create_task(f.member, f.project_id, new_task("First"))
            .await
            .unwrap();
        let second = f
            .service
            .create_task(f.member, f.project_id, new_task("Second"))
            .await
            .unwrap();

        let patched = f
            .service
            .patch_task(
                f.member,
                f.project_id,
                second.id,
                UpdateTask {
                    linked_to: Some(first.id),
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.linked_to, Some(first.id));

        let err = f
            .service
            .patch_task(
                f.member,
                f.project_id,
                second.id,
                UpdateTask {
                    linked_to: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = f
            .service
            .patch_task(f.member, f.project_id, Uuid::new_v4(), UpdateTask::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "task not found"));
    }

    #[tokio::test]
    async fn test_patch_applies_by_task_id_across_projects() {
        let f = setup().await;
        let task = f
            .service
            .create_task(f.member, f.project_id, new_task("Elsewhere"))
            .await
            .unwrap();

        // The outsider owns a different project and patches through it
        let own = f
            .store
            .create_project_with_admin(CreateProject {
                title: "Own".to_string(),
                description: None,
                created_by: f.outsider,
            })
            .await
            .unwrap();

        let patched = f
            .service
            .patch_task(
                f.outsider,
                own.id,
                task.id,
                UpdateTask {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.title, "Renamed");
        assert_eq!(patched.project_id, f.project_id);
    }

    #[tokio::test]
    async fn test_delete_tasks_by_filter() {
        let f = setup().await;
        f.service
            .create_task(f.member, f.project_id, new_task("Mine"))
            .await
            .unwrap();
        f.service
            .create_task(f.admin, f.project_id, new_task("Admin"))
            .await
            .unwrap();

        let deleted = f
            .service
            .delete_tasks(
                f.project_id,
                &TaskFilter {
                    is_created_by_admin: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let remaining = f
            .service
            .list_tasks(f.admin, f.project_id, TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Mine");
    }
}
