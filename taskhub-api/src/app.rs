/// Application state and router builder
///
/// [`AppState`] carries the three collaborators every service needs (store,
/// password hasher, token issuer) plus the configuration. Services are built
/// per request from the state; they only clone `Arc`s.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskhub_api::{app::{build_router, AppState}, config::Config};
/// use taskhub_shared::auth::{jwt::JwtIssuer, password::Argon2Hasher};
/// use taskhub_shared::store::memory::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let tokens = JwtIssuer::new(config.jwt.secret.clone(), chrono::Duration::hours(24));
/// let state = AppState::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(Argon2Hasher::new()?),
///     Arc::new(tokens),
///     config,
/// );
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use taskhub_shared::{
    auth::{jwt::TokenIssuer, middleware::authenticate, password::CredentialHasher},
    services::{
        auth::AuthService, membership::MembershipService, project::ProjectService,
        task::TaskService, user::UserService,
    },
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Persistence port
    pub store: Arc<dyn Store>,

    /// Password hasher
    pub hasher: Arc<dyn CredentialHasher>,

    /// Token issuer
    pub tokens: Arc<dyn TokenIssuer>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        store: Arc<dyn Store>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
        config: Config,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            config: Arc::new(config),
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.hasher.clone(), self.tokens.clone())
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.store.clone())
    }

    pub fn project_service(&self) -> ProjectService {
        ProjectService::new(self.store.clone())
    }

    pub fn membership_service(&self) -> MembershipService {
        MembershipService::new(self.store.clone())
    }

    pub fn task_service(&self) -> TaskService {
        TaskService::new(self.store.clone())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                               # public
/// ├── POST   /sign-up                              # public
/// ├── POST   /log-in                               # public
/// ├── /projects                                    # bearer token required below
/// │   ├── POST | GET | PATCH  /
/// │   ├── GET                 /count
/// │   ├── GET | PATCH | PUT | DELETE  /:id
/// │   ├── GET                 /:id/user
/// │   ├── GET | POST | PATCH | DELETE  /:id/project-users
/// │   ├── GET | POST | DELETE /:id/tasks
/// │   └── PATCH               /:id/tasks/:task_id
/// └── GET    /user-credentials/:id/user
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/sign-up", post(routes::auth::sign_up))
        .route("/log-in", post(routes::auth::log_in));

    let protected_routes = Router::new()
        .route(
            "/projects",
            post(routes::projects::create_project)
                .get(routes::projects::find_projects)
                .patch(routes::projects::update_all_projects),
        )
        .route("/projects/count", get(routes::projects::count_projects))
        .route(
            "/projects/:id",
            get(routes::projects::find_project_by_id)
                .patch(routes::projects::update_project)
                .put(routes::projects::replace_project)
                .delete(routes::projects::delete_project),
        )
        .route("/projects/:id/user", get(routes::projects::project_updater))
        .route(
            "/projects/:id/project-users",
            get(routes::memberships::list_memberships)
                .post(routes::memberships::add_membership)
                .patch(routes::memberships::patch_memberships)
                .delete(routes::memberships::delete_memberships),
        )
        .route(
            "/projects/:id/tasks",
            get(routes::tasks::list_tasks)
                .post(routes::tasks::create_task)
                .delete(routes::tasks::delete_tasks),
        )
        .route("/projects/:id/tasks/:task_id", patch(routes::tasks::patch_task))
        .route(
            "/user-credentials/:id/user",
            get(routes::users::credential_owner),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware
///
/// Verifies the token and injects an
/// [`AuthContext`](taskhub_shared::auth::middleware::AuthContext) into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = authenticate(req.headers(), state.tokens.as_ref())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
