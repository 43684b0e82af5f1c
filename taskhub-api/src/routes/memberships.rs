/// Project membership endpoints
///
/// ```text
/// GET    /projects/:id/project-users?<filter>   list
/// POST   /projects/:id/project-users            invite (admin only)
/// PATCH  /projects/:id/project-users?<filter>   change role, returns {count}
/// DELETE /projects/:id/project-users?<filter>   remove, returns {count}
/// ```
///
/// The project always comes from the path; a `project_id` in the body is ignored.

use super::Count;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use taskhub_shared::{
    auth::middleware::AuthContext,
    models::membership::{Membership, MembershipFilter, NewMembership, UpdateMembership},
};
use uuid::Uuid;

pub async fn list_memberships(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(filter): Query<MembershipFilter>,
) -> ApiResult<Json<Vec<Membership>>> {
    let memberships = state
        .membership_service()
        .list_memberships(project_id, &filter)
        .await?;
    Ok(Json(memberships))
}

/// Invite a user to the project
///
/// ```text
/// POST /projects/:id/project-users
/// Authorization: Bearer <token>
///
/// { "user_id": "uuid", "role": "MEMBER" }
/// ```
///
/// # Errors
///
/// - `422`: caller is not a member ("project not found") or not an admin ("Can not assign")
/// - `404`: the user does not exist
/// - `409`: the user is already a member
pub async fn add_membership(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<NewMembership>,
) -> ApiResult<Json<Membership>> {
    let membership = state
        .membership_service()
        .add_membership(auth.user_id, project_id, req)
        .await?;
    Ok(Json(membership))
}

pub async fn patch_memberships(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(filter): Query<MembershipFilter>,
    Json(req): Json<UpdateMembership>,
) -> ApiResult<Json<Count>> {
    let count = state
        .membership_service()
        .patch_memberships(project_id, req, &filter)
        .await?;
    Ok(Json(Count { count }))
}

pub async fn delete_memberships(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(filter): Query<MembershipFilter>,
) -> ApiResult<Json<Count>> {
    let count = state
        .membership_service()
        .delete_memberships(project_id, &filter)
        .await?;
    Ok(Json(Count { count }))
}
