/// Project model and database operations
///
/// A project owns its tasks and memberships; deleting a project cascades to
/// both. Every project has an ADMIN membership for its creator from the moment
/// it is created, which is why project creation goes through
/// [`Store::create_project_with_admin`](crate::store::Store::create_project_with_admin)
/// rather than [`Project::create`] alone.
///
/// # Filters
///
/// [`ProjectFilter`] is shared by listing, counting and bulk updates. The same
/// filter is evaluated in SQL by [`ProjectFilter::push_conditions`] and in
/// memory by [`ProjectFilter::matches`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

/// Project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project title (required, non-empty)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// User who created the project
    pub created_by: Option<Uuid>,

    /// User who last updated the project
    pub updated_by: Option<Uuid>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
    pub created_by: Uuid,
}

/// Request body for creating a project
///
/// Provenance and ids are never taken from the client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProject {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Full replacement of the client-editable fields
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplaceProject {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
}

/// Project query filter
///
/// Deserialized straight from the query string, e.g.
/// `GET /projects?created_by=<uuid>&limit=20`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFilter {
    /// Exact title match
    pub title: Option<String>,

    /// Creator
    pub created_by: Option<Uuid>,

    /// Maximum number of rows (list only)
    pub limit: Option<u32>,

    /// Rows to skip (list only)
    pub offset: Option<u32>,
}

impl ProjectFilter {
    /// Returns true if the project satisfies every condition of the filter
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(ref title) = self.title {
            if &project.title != title {
                return false;
            }
        }
        if let Some(created_by) = self.created_by {
            if project.created_by != Some(created_by) {
                return false;
            }
        }
        true
    }

    /// Appends ` AND ...` conditions to a query that already has a WHERE clause
    pub fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref title) = self.title {
            qb.push(" AND title = ").push_bind(title.clone());
        }
        if let Some(created_by) = self.created_by {
            qb.push(" AND created_by = ").push_bind(created_by);
        }
    }
}

const PROJECT_COLUMNS: &str =
    "id, title, description, created_at, updated_at, created_by, updated_by";

impl Project {
    /// Creates a new project
    ///
    /// The creator is stamped as both `created_by` and `updated_by`.
    pub async fn create<'e, E>(executor: E, data: CreateProject) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, created_by, updated_by)
            VALUES ($1, $2, $3, $3)
            RETURNING id, title, description, created_at, updated_at, created_by, updated_by
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(executor)
        .await
    }

    /// Finds a project by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, created_at, updated_at, created_by, updated_by
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists projects matching a filter, oldest first
    pub async fn list<'e, E>(executor: E, filter: &ProjectFilter) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PROJECT_COLUMNS).push(" FROM projects WHERE TRUE");
        filter.push_conditions(&mut qb);
        qb.push(" ORDER BY created_at ASC, id ASC");

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ").push_bind(i64::from(offset));
        }

        qb.build_query_as::<Project>().fetch_all(executor).await
    }

    /// Counts projects matching a filter (pagination is ignored)
    pub async fn count<'e, E>(executor: E, filter: &ProjectFilter) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects WHERE TRUE");
        filter.push_conditions(&mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(executor).await?;
        Ok(count)
    }

    /// Applies a partial update and stamps the updater
    ///
    /// Returns `None` if the project does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateProject,
        updated_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, created_at, updated_at, created_by, updated_by
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(updated_by)
        .fetch_optional(executor)
        .await
    }

    /// Applies a partial update to every project matching `filter`
    ///
    /// Returns the number of rows updated.
    pub async fn update_all<'e, E>(
        executor: E,
        filter: &ProjectFilter,
        data: UpdateProject,
        updated_by: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET title = COALESCE(");
        qb.push_bind(data.title)
            .push(", title), description = COALESCE(")
            .push_bind(data.description)
            .push(", description), updated_by = ")
            .push_bind(updated_by)
            .push(", updated_at = NOW() WHERE TRUE");
        filter.push_conditions(&mut qb);

        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Overwrites title and description and stamps the updater
    ///
    /// Returns `None` if the project does not exist.
    pub async fn replace<'e, E>(
        executor: E,
        id: Uuid,
        data: ReplaceProject,
        updated_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = $2,
                description = $3,
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, created_at, updated_at, created_by, updated_by
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(updated_by)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a project (cascades to tasks and memberships)
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
