/// Project task endpoints
///
/// ```text
/// GET    /projects/:id/tasks?<filter>     list tasks visible to the caller
/// POST   /projects/:id/tasks              create
/// DELETE /projects/:id/tasks?<filter>     delete matching, returns {count}
/// PATCH  /projects/:id/tasks/:task_id     patch (204)
/// ```
///
/// Listing, creating and patching require a membership in the project.
/// Members who are not admins never see tasks created by admins.

use super::Count;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use taskhub_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Task, TaskFilter, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state
        .task_service()
        .list_tasks(auth.user_id, project_id, filter)
        .await?;
    Ok(Json(tasks))
}

/// Create a task in the project
///
/// ```text
/// POST /projects/:id/tasks
/// Authorization: Bearer <token>
///
/// { "title": "Write release notes", "description": "v1.2" }
/// ```
///
/// Only `title` and `description` are read from the body.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<NewTask>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = state
        .task_service()
        .create_task(auth.user_id, project_id, req)
        .await?;
    Ok(Json(task))
}

pub async fn delete_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Count>> {
    let count = state.task_service().delete_tasks(project_id, &filter).await?;
    Ok(Json(Count { count }))
}

/// Patch a task
///
/// # Errors
///
/// - `422`: caller is not a member, or a non-admin set `assigned_to`
/// - `404`: unknown task, assignee or linked task
pub async fn patch_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .task_service()
        .patch_task(auth.user_id, project_id, task_id, req)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
