/// User relation endpoints

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use taskhub_shared::models::user::User;
use uuid::Uuid;

/// The user a credential belongs to
///
/// ```text
/// GET /user-credentials/:id/user
/// ```
pub async fn credential_owner(
    State(state): State<AppState>,
    Path(credential_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = state
        .user_service()
        .user_for_credential(credential_id)
        .await?;
    Ok(Json(user))
}
