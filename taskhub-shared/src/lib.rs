//! # TaskHub Shared Library
//!
//! Domain logic for the TaskHub project/task backend, used by the API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models, request shapes and filters
//! - `store`: Persistence port with Postgres and in-memory implementations
//! - `auth`: Password hashing, tokens, bearer parsing and the membership guard
//! - `services`: Sign-up/log-in, projects, memberships and tasks
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the TaskHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
