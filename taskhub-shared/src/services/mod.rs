/// Domain services
///
/// Each service owns the rules for one area of the system and talks to
/// persistence only through the [`Store`](crate::store::Store) port:
///
/// - [`auth::AuthService`]: sign-up and log-in
/// - [`user::UserService`]: user lookups for relation endpoints
/// - [`project::ProjectService`]: project CRUD
/// - [`membership::MembershipService`]: project membership management
/// - [`task::TaskService`]: role-scoped task operations
///
/// Services are cheap to construct; they hold `Arc`s only.

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

pub mod auth;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;

/// Service error types
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected by a business rule
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Credentials were rejected
    #[error("{0}")]
    Unauthorized(String),

    /// Caller's project role does not allow the action
    #[error("{0}")]
    Forbidden(String),

    /// Caller is not a member of the project
    #[error("project not found")]
    NotAuthorized,

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Persistence failure
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token signing failure
    #[error(transparent)]
    Token(#[from] JwtError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                tracing::debug!(%constraint, "Constraint violation");
                ServiceError::Conflict(conflict_message(&constraint).to_string())
            }
            other => ServiceError::Store(other),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthorized { .. } => ServiceError::NotAuthorized,
            AuthzError::Forbidden { required, actual } => ServiceError::Forbidden(format!(
                "Insufficient permissions: requires {}, has {}",
                required, actual
            )),
            AuthzError::Store(e) => e.into(),
        }
    }
}

/// Client-facing message for a violated constraint
fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "users_email_key" => "this email already exists",
        "project_users_user_project_key" => "user is already a member",
        c if c.ends_with("_fkey") => "referenced record does not exist",
        _ => "request conflicts with existing data",
    }
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;
