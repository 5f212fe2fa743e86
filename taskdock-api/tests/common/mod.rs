//! Common test utilities for integration tests
//!
//! Provides a [`TestContext`] that builds the full router against a test
//! database. The MongoDB driver connects lazily, so tests that never reach
//! the store (the access control gate tests) run without a server; tests
//! that do need one read `TEST_DATABASE_URL` and are `#[ignore]`d by
//! default.

use axum::body::Body;
use axum::http::Request;

use taskdock_api::app::{build_router, AppState};
use taskdock_api::config::{ApiConfig, AuthConfig, Config};
use taskdock_shared::auth::jwt::{self, JwtConfig};
use taskdock_shared::db::client::{self, StoreConfig};
use taskdock_shared::models::user::UserRole;

/// Test context containing the assembled application
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a test context against the test database
    pub async fn new() -> anyhow::Result<Self> {
        let url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: StoreConfig {
                url,
                database: "taskdock_test".to_string(),
            },
            jwt: JwtConfig {
                secret: "integration-test-secret-at-least-32-bytes".to_string(),
                algorithm: "HS256".to_string(),
                expire_days: 3,
            },
            auth: AuthConfig {
                min_password_length: 8,
                default_admin_email: "admin@taskdock.dev".to_string(),
                default_admin_password: "admin-password-1".to_string(),
            },
            ownership_field: "created_by".to_string(),
        };

        let db = client::connect(&config.database).await?;
        let state = AppState::new(db, config.clone());

        Ok(Self {
            app: build_router(state),
            config,
        })
    }

    /// Issues a valid token for an arbitrary caller identity
    pub fn token_for(&self, user_id: &str, role: UserRole) -> String {
        jwt::issue_token(user_id, role, &self.config.jwt).expect("Should issue token")
    }
}

/// Builds a JSON request with an optional bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Reads a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}
