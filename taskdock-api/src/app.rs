//! Application state and router builder
//!
//! The store handle and the domain services are built exactly once at process
//! start and injected into every handler through [`AppState`] — nothing in
//! the system reaches for ambient global state.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use mongodb::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use taskdock_shared::service::tasks::TaskService;
use taskdock_shared::service::users::UserService;

use crate::config::Config;
use crate::middleware::auth::{authenticate, require_admin};

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the clones
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle
    pub db: Database,

    /// Application configuration
    pub config: Arc<Config>,

    /// User domain service
    pub users: Arc<UserService>,

    /// Task domain service
    pub tasks: Arc<TaskService>,
}

impl AppState {
    /// Creates the application state, wiring every service to the store
    pub fn new(db: Database, config: Config) -> Self {
        let users = UserService::new(
            &db,
            Some(config.ownership_field.clone()),
            config.auth.min_password_length,
        );
        let tasks = TaskService::new(&db, Some(config.ownership_field.clone()));

        Self {
            db,
            config: Arc::new(config),
            users: Arc::new(users),
            tasks: Arc::new(tasks),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /v1
/// ├── /health/ping              # public
/// ├── /users
/// │   ├── POST /register        # public
/// │   ├── POST /login           # public
/// │   ├── GET/PUT /me           # authenticated
/// │   └── GET /, GET/PUT/DELETE /:id   # admin only
/// └── /tasks                    # authenticated, ownership-scoped
///     ├── GET /, POST /
///     └── GET/PUT/DELETE /:id
/// ```
///
/// The access control gate runs as route-group middleware: `authenticate`
/// first, then (where required) `require_admin`. Gate failure short-circuits
/// before the handler.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/ping", get(routes::health::ping));

    let public_user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login));

    let me_routes = Router::new()
        .route(
            "/me",
            get(routes::users::get_me).put(routes::users::edit_me),
        )
        .layer(from_fn_with_state(state.clone(), authenticate));

    let admin_user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::edit_user)
                .delete(routes::users::delete_user),
        )
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(state.clone(), authenticate));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::edit_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(from_fn_with_state(state.clone(), authenticate));

    let v1_routes = Router::new()
        .nest("/health", health_routes)
        .nest(
            "/users",
            public_user_routes.merge(me_routes).merge(admin_user_routes),
        )
        .nest("/tasks", task_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
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
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
