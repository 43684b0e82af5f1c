/// Membership model and database operations
///
/// This module provides the Membership model (a "project user") for
/// user-project relationships with RBAC. Membership is the only authority for
/// who can see and do what inside a project.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM ('ADMIN', 'MEMBER');
///
/// CREATE TABLE project_users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     role project_role NOT NULL,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT project_users_user_project_key UNIQUE (user_id, project_id)
/// );
/// ```
///
/// # Roles
///
/// - **ADMIN**: Invite members, assign tasks, see admin-authored tasks
/// - **MEMBER**: Create tasks, see tasks authored by non-admins, list members
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::membership::{CreateMembership, Membership, ProjectRole};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let membership = Membership::create(&pool, CreateMembership {
///     project_id,
///     user_id,
///     role: ProjectRole::Member,
/// }).await?;
///
/// let found = Membership::find(&pool, project_id, user_id).await?;
/// assert_eq!(found.map(|m| m.id), Some(membership.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use std::fmt;
use uuid::Uuid;

/// RBAC roles for project memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    /// Can invite members, assign tasks and see every task
    Admin,

    /// Can create tasks and see tasks authored by non-admins
    Member,
}

impl ProjectRole {
    /// Converts role to its wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Admin => "ADMIN",
            ProjectRole::Member => "MEMBER",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, ProjectRole::Admin)
    }

    /// Checks if this role has the permission level of the required role
    ///
    /// Hierarchy: Admin > Member
    pub fn has_permission(&self, required: &ProjectRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            ProjectRole::Admin => 2,
            ProjectRole::Member => 1,
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership (user-project relationship)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Membership ID
    pub id: Uuid,

    /// Role within the project
    pub role: ProjectRole,

    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the user joined the project
    pub created_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
}

/// Request body for inviting a user to a project
///
/// There is no `project_id` field: the project always comes from the request
/// path, and any `project_id` in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMembership {
    pub user_id: Uuid,
    pub role: ProjectRole,
}

/// Bulk membership patch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMembership {
    pub role: Option<ProjectRole>,
}

/// Membership query filter, always evaluated within one project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipFilter {
    pub user_id: Option<Uuid>,
    pub role: Option<ProjectRole>,
}

impl MembershipFilter {
    /// Returns true if the membership satisfies every condition of the filter
    pub fn matches(&self, membership: &Membership) -> bool {
        self.user_id.map_or(true, |id| membership.user_id == id)
            && self.role.map_or(true, |role| membership.role == role)
    }

    /// Appends ` AND ...` conditions to a query that already has a WHERE clause
    pub fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(user_id) = self.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(role) = self.role {
            qb.push(" AND role = ").push_bind(role);
        }
    }
}

impl Membership {
    /// Creates a new membership
    ///
    /// # Errors
    ///
    /// Returns a database error if the user already belongs to the project
    /// (`project_users_user_project_key`).
    pub async fn create<'e, E>(executor: E, data: CreateMembership) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO project_users (role, project_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, role, project_id, user_id, created_at
            "#,
        )
        .bind(data.role)
        .bind(data.project_id)
        .bind(data.user_id)
        .fetch_one(executor)
        .await
    }

    /// Finds the membership of a user in a project
    pub async fn find<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, role, project_id, user_id, created_at
            FROM project_users
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists the memberships of a project, oldest first
    pub async fn list_by_project<'e, E>(
        executor: E,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, role, project_id, user_id, created_at FROM project_users WHERE project_id = ",
        );
        qb.push_bind(project_id);
        filter.push_conditions(&mut qb);
        qb.push(" ORDER BY created_at ASC, id ASC");

        qb.build_query_as::<Membership>().fetch_all(executor).await
    }

    /// Updates every membership of the project matching `filter`
    ///
    /// Returns the number of rows updated.
    pub async fn update_where<'e, E>(
        executor: E,
        project_id: Uuid,
        filter: &MembershipFilter,
        data: UpdateMembership,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE project_users SET role = COALESCE(");
        qb.push_bind(data.role)
            .push(", role) WHERE project_id = ")
            .push_bind(project_id);
        filter.push_conditions(&mut qb);

        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Deletes every membership of the project matching `filter`
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_where<'e, E>(
        executor: E,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM project_users WHERE project_id = ");
        qb.push_bind(project_id);
        filter.push_conditions(&mut qb);

        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}
