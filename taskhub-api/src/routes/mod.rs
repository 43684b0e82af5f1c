/// API route handlers
///
/// Handlers are thin: extract, build the service from [`AppState`](crate::app::AppState),
/// call it, wrap the result.
///
/// - `health`: Health check endpoint
/// - `auth`: Sign-up and log-in
/// - `projects`: Project CRUD
/// - `memberships`: Project members
/// - `tasks`: Project tasks
/// - `users`: User relation lookups

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod memberships;
pub mod projects;
pub mod tasks;
pub mod users;

/// Response of bulk and counting endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}
