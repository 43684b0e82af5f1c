/// Project endpoints
///
/// Only creation ties a project to its caller (who becomes ADMIN). The
/// by-id endpoints are reachable by any authenticated user.
///
/// # Endpoints
///
/// ```text
/// POST   /projects              create
/// GET    /projects?<filter>     list
/// PATCH  /projects?<filter>     update all matching, returns {count}
/// GET    /projects/count        count, returns {count}
/// GET    /projects/:id          read
/// PATCH  /projects/:id          partial update (204)
/// PUT    /projects/:id          replace (204)
/// DELETE /projects/:id          delete with tasks and members (204)
/// GET    /projects/:id/user     last updater
/// ```

use super::Count;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use taskhub_shared::{
    auth::middleware::AuthContext,
    models::{
        project::{NewProject, Project, ProjectFilter, ReplaceProject, UpdateProject},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create a project owned by the caller
///
/// ```text
/// POST /projects
/// Authorization: Bearer <token>
///
/// { "title": "Roadmap", "description": "Q3 goals" }
/// ```
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<NewProject>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = state.project_service().create_project(auth.user_id, req).await?;
    Ok(Json(project))
}

pub async fn find_projects(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.project_service().find_projects(&filter).await?;
    Ok(Json(projects))
}

/// Update every project matching the query filter
pub async fn update_all_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<ProjectFilter>,
    Json(req): Json<UpdateProject>,
) -> ApiResult<Json<Count>> {
    req.validate()?;

    let count = state
        .project_service()
        .update_projects(&filter, req, auth.user_id)
        .await?;
    Ok(Json(Count { count }))
}

pub async fn count_projects(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<Json<Count>> {
    let count = state.project_service().count_projects(&filter).await?;
    Ok(Json(Count { count }))
}

pub async fn find_project_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = state.project_service().find_project_by_id(id).await?;
    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .project_service()
        .update_project(id, req, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplaceProject>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .project_service()
        .replace_project(id, req, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.project_service().delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The user who last updated the project
pub async fn project_updater(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = state.project_service().project_updater(id).await?;
    Ok(Json(user))
}
