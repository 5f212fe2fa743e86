//! Health check endpoint
//!
//! # Endpoint
//!
//! ```text
//! GET /v1/health/ping
//! ```
//!
//! Response:
//! ```json
//! {
//!   "ping": "pong!",
//!   "version": "0.1.0",
//!   "database": "connected"
//! }
//! ```

use axum::extract::State;
use axum::Json;
use bson::doc;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiResult;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub ping: String,

    /// Application version
    pub version: String,

    /// Document store status
    pub database: String,
}

/// Health check handler; pings the store to report connectivity
pub async fn ping(State(state): State<AppState>) -> ApiResult<Json<PingResponse>> {
    let database = match state.db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(PingResponse {
        ping: "pong!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}
