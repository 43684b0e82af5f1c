/// Project-scoped access guard
///
/// Membership is the single source of authority inside a project. Every
/// project- or task-scoped operation resolves the caller's [`Membership`]
/// first and then checks the role it carries.
///
/// # Permission Model
///
/// 1. **Project Membership**: the caller must have a membership row for the project
/// 2. **Role-Based Permissions**: [`ProjectRole`] decides the rest (Admin > Member)
///
/// A caller without a membership gets [`AuthzError::NotAuthorized`], which is
/// reported as "project not found" whether or not the project exists.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::authorization::{authorize, ProjectAction};
/// use taskhub_shared::store::Store;
/// use uuid::Uuid;
///
/// # async fn example(store: &dyn Store, user_id: Uuid, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Only admins may invite members
/// let membership = authorize(store, user_id, project_id, ProjectAction::AddMember).await?;
/// assert!(membership.role.is_admin());
/// # Ok(())
/// # }
/// ```

use tracing::debug;
use uuid::Uuid;

use crate::models::membership::{Membership, ProjectRole};
use crate::store::{Store, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller has no membership in the project
    #[error("project not found")]
    NotAuthorized { project_id: Uuid },

    /// Caller's role is below the one required
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    Forbidden {
        required: ProjectRole,
        actual: ProjectRole,
    },

    /// Membership lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Actions gated by project role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    /// Invite a user to the project
    AddMember,

    /// Set `assigned_to` on a task
    AssignTask,

    /// See tasks authored by admins
    ViewAdminTasks,

    /// Create a task
    CreateTask,

    /// List the tasks a member may see
    ListTasks,
}

impl ProjectAction {
    /// Gets the minimum role required for this action
    pub fn min_role(&self) -> ProjectRole {
        match self {
            ProjectAction::AddMember
            | ProjectAction::AssignTask
            | ProjectAction::ViewAdminTasks => ProjectRole::Admin,
            ProjectAction::CreateTask | ProjectAction::ListTasks => ProjectRole::Member,
        }
    }

    /// Whether a member holding `role` may perform this action
    pub fn permits(&self, role: ProjectRole) -> bool {
        role.has_permission(&self.min_role())
    }
}

/// Resolves the caller's membership in a project
///
/// # Arguments
///
/// * `store` - Persistence port
/// * `user_id` - Authenticated caller
/// * `project_id` - Project from the request path
/// * `required` - Minimum role, or `None` for any member
///
/// # Errors
///
/// - `NotAuthorized` if the caller has no membership (or the project does not exist)
/// - `Forbidden` if the caller's role is below `required`
/// - `Store` if the lookup itself fails
pub async fn resolve_membership(
    store: &dyn Store,
    user_id: Uuid,
    project_id: Uuid,
    required: Option<ProjectRole>,
) -> Result<Membership, AuthzError> {
    let membership = match store.find_membership(project_id, user_id).await? {
        Some(membership) => membership,
        None => {
            debug!(%user_id, %project_id, "Rejected: not a project member");
            return Err(AuthzError::NotAuthorized { project_id });
        }
    };

    if let Some(required) = required {
        if !membership.role.has_permission(&required) {
            debug!(
                %user_id,
                %project_id,
                role = %membership.role,
                required = %required,
                "Rejected: insufficient project role"
            );
            return Err(AuthzError::Forbidden {
                required,
                actual: membership.role,
            });
        }
    }

    Ok(membership)
}

/// Requires any membership in the project
pub async fn require_membership(
    store: &dyn Store,
    user_id: Uuid,
    project_id: Uuid,
) -> Result<Membership, AuthzError> {
    resolve_membership(store, user_id, project_id, None).await
}

/// Requires at least `required_role` in the project
pub async fn require_role(
    store: &dyn Store,
    user_id: Uuid,
    project_id: Uuid,
    required_role: ProjectRole,
) -> Result<Membership, AuthzError> {
    resolve_membership(store, user_id, project_id, Some(required_role)).await
}

/// Requires the role needed for `action`
pub async fn authorize(
    store: &dyn Store,
    user_id: Uuid,
    project_id: Uuid,
    action: ProjectAction,
) -> Result<Membership, AuthzError> {
    require_role(store, user_id, project_id, action.min_role()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::CreateMembership;
    use crate::models::project::CreateProject;
    use crate::models::user::CreateUser;
    use crate::store::memory::MemoryStore;

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

    /// Project owned by an admin with one plain member
    async fn setup() -> (MemoryStore, Uuid, Uuid, Uuid) {
        let store = MemoryStore::new();
        let admin = user(&store, "admin@example.com").await;
        let member = user(&store, "member@example.com").await;

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

        (store, project.id, admin, member)
    }

    #[test]
    fn test_action_min_role() {
        assert_eq!(ProjectAction::AddMember.min_role(), ProjectRole::Admin);
        assert_eq!(ProjectAction::AssignTask.min_role(), ProjectRole::Admin);
        assert_eq!(ProjectAction::ViewAdminTasks.min_role(), ProjectRole::Admin);
        assert_eq!(ProjectAction::CreateTask.min_role(), ProjectRole::Member);
        assert_eq!(ProjectAction::ListTasks.min_role(), ProjectRole::Member);

        assert!(ProjectAction::AssignTask.permits(ProjectRole::Admin));
        assert!(!ProjectAction::AssignTask.permits(ProjectRole::Member));
        assert!(!ProjectAction::ViewAdminTasks.permits(ProjectRole::Member));
        assert!(ProjectAction::CreateTask.permits(ProjectRole::Member));
    }

    #[tokio::test]
    async fn test_member_resolves_without_required_role() {
        let (store, project_id, _, member) = setup().await;

        let membership = require_membership(&store, member, project_id).await.unwrap();
        assert_eq!(membership.role, ProjectRole::Member);
        assert_eq!(membership.user_id, member);
    }

    #[tokio::test]
    async fn test_admin_satisfies_any_requirement() {
        let (store, project_id, admin, _) = setup().await;

        assert!(require_role(&store, admin, project_id, ProjectRole::Admin).await.is_ok());
        assert!(require_role(&store, admin, project_id, ProjectRole::Member).await.is_ok());
        assert!(authorize(&store, admin, project_id, ProjectAction::AssignTask).await.is_ok());
    }

    #[tokio::test]
    async fn test_member_forbidden_from_admin_actions() {
        let (store, project_id, _, member) = setup().await;

        let result = authorize(&store, member, project_id, ProjectAction::AddMember).await;
        assert!(matches!(
            result,
            Err(AuthzError::Forbidden {
                required: ProjectRole::Admin,
                actual: ProjectRole::Member,
            })
        ));
    }

    #[tokio::test]
    async fn test_outsider_not_authorized() {
        let (store, project_id, _, _) = setup().await;
        let outsider = user(&store, "outsider@example.com").await;

        let result = require_membership(&store, outsider, project_id).await;
        assert!(matches!(result, Err(AuthzError::NotAuthorized { .. })));
    }

    #[tokio::test]
    async fn test_missing_project_indistinguishable_from_non_member() {
        let (store, _, admin, _) = setup().await;

        let err = require_membership(&store, admin, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::NotAuthorized { .. }));
        assert_eq!(err.to_string(), "project not found");
    }
}
