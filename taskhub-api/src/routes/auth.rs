/// Sign-up and log-in endpoints
///
/// Both are public. Sign-up checks run inside the auth service in a fixed
/// order, so the request bodies carry no `validator` rules of their own.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use taskhub_shared::{
    models::user::User,
    services::auth::{AuthToken, LogIn, SignUp},
};

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /sign-up
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "correct horse",
///   "name": "Ada"
/// }
/// ```
///
/// # Response
///
/// The created user; the password never appears in it.
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "Ada",
///   "email": "ada@example.com",
///   "created_at": "2025-01-01T00:00:00Z",
///   "updated_at": "2025-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: invalid or taken email, email or password too short
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUp>,
) -> ApiResult<Json<User>> {
    let user = state.auth_service().sign_up(req).await?;
    Ok(Json(user))
}

/// Authenticate and obtain a bearer token
///
/// # Endpoint
///
/// ```text
/// POST /log-in
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "correct horse" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: unknown email ("customer not found")
/// - `401 Unauthorized`: wrong password ("password is not valid")
pub async fn log_in(
    State(state): State<AppState>,
    Json(req): Json<LogIn>,
) -> ApiResult<Json<AuthToken>> {
    let token = state.auth_service().log_in(req).await?;
    Ok(Json(token))
}
