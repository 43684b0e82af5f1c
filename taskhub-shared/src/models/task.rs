/// Task model and database operations
///
/// Tasks always belong to a project. Two fields carry authorization meaning:
///
/// - `is_created_by_admin` is set once at creation from the creator's role
///   and is never patchable. Non-admin members never see tasks where it is true.
/// - `assigned_to` may only be set by an admin (enforced by the task service).
///
/// # Status Lifecycle
///
/// ```text
/// TODO ──> IN_PROGRESS ──> DONE
/// ```
///
/// New tasks always start in `TODO`; any status may be patched afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

/// Task status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started (initial state)
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

/// Task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title (required, non-empty)
    pub title: String,

    /// Current status
    pub status: TaskStatus,

    /// Optional description
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Whether the creator held the ADMIN role at creation time (immutable)
    pub is_created_by_admin: bool,

    /// Owning project
    pub project_id: Uuid,

    /// Assignee
    pub assigned_to: Option<Uuid>,

    /// Related task
    pub linked_to: Option<Uuid>,

    /// Creator
    pub created_by: Option<Uuid>,

    /// Last updater
    pub updated_by: Option<Uuid>,
}

/// Input for creating a task
///
/// Built by the task service from the caller's membership; clients only
/// supply the title and description (see [`NewTask`]).
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: Uuid,
    pub is_created_by_admin: bool,
    pub created_by: Uuid,
}

/// Client-supplied fields for a new task
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
}

/// Task patch; `None` leaves the column untouched
///
/// Provenance (`created_by`, `updated_by`, timestamps), `project_id` and
/// `is_created_by_admin` are intentionally absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
    pub linked_to: Option<Uuid>,
}

/// Task query filter, always evaluated within one project
///
/// Deserialized from the query string, e.g.
/// `GET /projects/{id}/tasks?status=TODO&is_created_by_admin=false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub is_created_by_admin: Option<bool>,

    /// Maximum number of rows (list only)
    pub limit: Option<u32>,

    /// Rows to skip (list only)
    pub offset: Option<u32>,
}

impl TaskFilter {
    /// Returns true if the task satisfies every condition of the filter
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.assigned_to.map_or(true, |id| task.assigned_to == Some(id))
            && self.created_by.map_or(true, |id| task.created_by == Some(id))
            && self
                .is_created_by_admin
                .map_or(true, |flag| task.is_created_by_admin == flag)
    }

    /// Appends ` AND ...` conditions to a query that already has a WHERE clause
    pub fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(assigned_to) = self.assigned_to {
            qb.push(" AND assigned_to = ").push_bind(assigned_to);
        }
        if let Some(created_by) = self.created_by {
            qb.push(" AND created_by = ").push_bind(created_by);
        }
        if let Some(flag) = self.is_created_by_admin {
            qb.push(" AND is_created_by_admin = ").push_bind(flag);
        }
    }
}

const TASK_COLUMNS: &str = "id, title, status, description, created_at, updated_at, \
     is_created_by_admin, project_id, assigned_to, linked_to, created_by, updated_by";

impl Task {
    /// Creates a task in `TODO`, stamping the creator as both creator and updater
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO tasks (title, status, description, is_created_by_admin, project_id, created_by, updated_by) VALUES (",
        );
        qb.push_bind(data.title)
            .push(", ")
            .push_bind(TaskStatus::Todo)
            .push(", ")
            .push_bind(data.description)
            .push(", ")
            .push_bind(data.is_created_by_admin)
            .push(", ")
            .push_bind(data.project_id)
            .push(", ")
            .push_bind(data.created_by)
            .push(", ")
            .push_bind(data.created_by)
            .push(") RETURNING ")
            .push(TASK_COLUMNS);

        qb.build_query_as::<Task>().fetch_one(executor).await
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(TASK_COLUMNS)
            .push(" FROM tasks WHERE id = ")
            .push_bind(id);

        qb.build_query_as::<Task>().fetch_optional(executor).await
    }

    /// Lists the tasks of a project matching a filter, oldest first
    pub async fn list_by_project<'e, E>(
        executor: E,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(TASK_COLUMNS)
            .push(" FROM tasks WHERE project_id = ")
            .push_bind(project_id);
        filter.push_conditions(&mut qb);
        qb.push(" ORDER BY created_at ASC, id ASC");

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ").push_bind(i64::from(offset));
        }

        qb.build_query_as::<Task>().fetch_all(executor).await
    }

    /// Applies a patch by task ID and stamps the updater
    ///
    /// Returns `None` if the task does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateTask,
        updated_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE tasks SET title = COALESCE(");
        qb.push_bind(data.title)
            .push(", title), description = COALESCE(")
            .push_bind(data.description)
            .push(", description), status = COALESCE(")
            .push_bind(data.status)
            .push(", status), assigned_to = COALESCE(")
            .push_bind(data.assigned_to)
            .push(", assigned_to), linked_to = COALESCE(")
            .push_bind(data.linked_to)
            .push(", linked_to), updated_by = ")
            .push_bind(updated_by)
            .push(", updated_at = NOW() WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(TASK_COLUMNS);

        qb.build_query_as::<Task>().fetch_optional(executor).await
    }

    /// Deletes every task of the project matching `filter`
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_where<'e, E>(
        executor: E,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM tasks WHERE project_id = ");
        qb.push_bind(project_id);
        filter.push_conditions(&mut qb);

        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(is_created_by_admin: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Write release notes".to_string(),
            status: TaskStatus::Todo,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_created_by_admin,
            project_id: Uuid::new_v4(),
            assigned_to: None,
            linked_to: None,
            created_by: Some(Uuid::new_v4()),
            updated_by: None,
        }
    }

    #[test]
    fn test_status_default_and_wire_format() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(TaskStatus::Done.as_str(), "DONE");
    }

    #[test]
    fn test_filter_admin_origin() {
        let admin_task = task(true);
        let member_task = task(false);

        let non_admin_view = TaskFilter {
            is_created_by_admin: Some(false),
            ..Default::default()
        };
        assert!(!non_admin_view.matches(&admin_task));
        assert!(non_admin_view.matches(&member_task));

        let unrestricted = TaskFilter::default();
        assert!(unrestricted.matches(&admin_task));
        assert!(unrestricted.matches(&member_task));
    }

    #[test]
    fn test_filter_by_status_and_assignee() {
        let mut t = task(false);
        let assignee = Uuid::new_v4();
        t.assigned_to = Some(assignee);
        t.status = TaskStatus::InProgress;

        assert!(TaskFilter {
            status: Some(TaskStatus::InProgress),
            assigned_to: Some(assignee),
            ..Default::default()
        }
        .matches(&t));

        assert!(!TaskFilter {
            status: Some(TaskStatus::Done),
            ..Default::default()
        }
        .matches(&t));
    }

    #[test]
    fn test_patch_ignores_immutable_fields() {
        let body = serde_json::json!({
            "title": "Renamed",
            "is_created_by_admin": true,
            "project_id": Uuid::new_v4(),
            "created_by": Uuid::new_v4(),
        });

        let patch: UpdateTask = serde_json::from_value(body).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Renamed"));
        assert!(patch.assigned_to.is_none());
    }

    #[test]
    fn test_filter_sql_conditions() {
        let filter = TaskFilter {
            is_created_by_admin: Some(false),
            ..Default::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM tasks WHERE project_id = ");
        qb.push_bind(Uuid::new_v4());
        filter.push_conditions(&mut qb);

        assert_eq!(
            qb.sql(),
            "DELETE FROM tasks WHERE project_id = $1 AND is_created_by_admin = $2"
        );
    }
}
