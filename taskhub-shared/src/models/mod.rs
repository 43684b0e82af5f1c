/// Database models for TaskHub
///
/// This module contains the domain records and their SQL operations. Each
/// operation accepts any `PgExecutor`, so the same call works against a pool
/// or inside a transaction.
///
/// # Models
///
/// - `user`: User accounts
/// - `credential`: Password hashes, stored apart from users
/// - `project`: Projects
/// - `membership`: User-project relationships with roles
/// - `task`: Tasks scoped to a project
///
/// Services do not call these directly; they go through the
/// [`Store`](crate::store::Store) port, whose Postgres implementation
/// delegates here.

pub mod credential;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;
