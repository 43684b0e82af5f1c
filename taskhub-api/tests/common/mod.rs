//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An application wired to the in-memory store
//! - User sign-up and log-in helpers
//! - Request helpers that drive the router without a socket

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::Config;
use taskhub_shared::auth::jwt::JwtIssuer;
use taskhub_shared::auth::password::Argon2Hasher;
use taskhub_shared::store::memory::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
}

/// A signed-up user with a live token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Status plus parsed JSON body (`Value::Null` for empty bodies)
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Creates a fresh application over an empty in-memory store
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgresql://unused/taskhub_test"),
            ("JWT_SECRET", TEST_SECRET),
            ("CORS_ORIGINS", "*"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("test config");

        let store = Arc::new(MemoryStore::new());
        let hasher = Argon2Hasher::with_params(1024, 1, 1).expect("test hasher");
        let tokens = JwtIssuer::new(TEST_SECRET, chrono::Duration::hours(1));

        let state = AppState::new(
            store.clone(),
            Arc::new(hasher),
            Arc::new(tokens),
            config.clone(),
        );
        let app = build_router(state);

        TestContext { store, app, config }
    }

    /// Sends a request and parses the JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, user.auth_header());
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> TestResponse {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: &TestUser, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &TestUser, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> TestResponse {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    /// Signs up `email` with [`TEST_PASSWORD`] and logs in
    pub async fn user(&self, email: &str) -> TestUser {
        let signed_up = self
            .request(
                Method::POST,
                "/sign-up",
                None,
                Some(serde_json::json!({ "email": email, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(signed_up.status, StatusCode::OK, "sign-up failed: {:?}", signed_up.body);

        let logged_in = self
            .request(
                Method::POST,
                "/log-in",
                None,
                Some(serde_json::json!({ "email": email, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(logged_in.status, StatusCode::OK, "log-in failed: {:?}", logged_in.body);

        TestUser {
            id: parse_id(&signed_up.body),
            email: email.to_string(),
            token: logged_in.body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a project as `owner` and returns its ID
    pub async fn project(&self, owner: &TestUser, title: &str) -> Uuid {
        let response = self
            .post("/projects", owner, serde_json::json!({ "title": title }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        parse_id(&response.body)
    }

    /// Adds `user` to the project as `role`, acting as `admin`
    pub async fn invite(&self, admin: &TestUser, project_id: Uuid, user: &TestUser, role: &str) {
        let response = self
            .post(
                &format!("/projects/{}/project-users", project_id),
                admin,
                serde_json::json!({ "user_id": user.id, "role": role }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    /// Creates a task as `user` and returns its ID
    pub async fn task(&self, user: &TestUser, project_id: Uuid, title: &str) -> Uuid {
        let response = self
            .post(
                &format!("/projects/{}/tasks", project_id),
                user,
                serde_json::json!({ "title": title }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        parse_id(&response.body)
    }
}

/// Reads the `id` field of a JSON object
pub fn parse_id(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("no id in {:?}", body))
}

/// Sorted task titles from a JSON array
pub fn titles(body: &Value) -> Vec<String> {
    let mut titles: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    titles
}
