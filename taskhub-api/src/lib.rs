//! # TaskHub API Server Library
//!
//! HTTP surface of the TaskHub project tracker: sign-up and log-in, projects,
//! project memberships and project tasks. Handlers are thin; the rules live in
//! `taskhub_shared::services`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
