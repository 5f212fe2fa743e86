//! MongoDB client construction
//!
//! The client is created exactly once at process start and handed to every
//! service by reference — there is no ambient global handle. The driver
//! multiplexes its own connection pool behind the returned [`Database`], so
//! the handle is cheap to clone and safe for concurrent use.
//!
//! # Example
//!
//! ```no_run
//! use taskdock_shared::db::client::{connect, StoreConfig};
//!
//! # async fn example() -> Result<(), taskdock_shared::error::AppError> {
//! let config = StoreConfig {
//!     url: "mongodb://localhost:27017".to_string(),
//!     database: "taskdock".to_string(),
//! };
//!
//! let db = connect(&config).await?;
//! # Ok(())
//! # }
//! ```

use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::info;

use crate::error::AppResult;

/// Connection settings for the document store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// MongoDB connection string (e.g. "mongodb://localhost:27017")
    pub url: String,

    /// Database name to operate on
    pub database: String,
}

/// Connects to MongoDB and returns a handle to the configured database
///
/// The driver establishes connections lazily; this call parses and validates
/// the connection string but does not require the server to be reachable yet.
pub async fn connect(config: &StoreConfig) -> AppResult<Database> {
    let options = ClientOptions::parse(&config.url).await?;
    let client = Client::with_options(options)?;

    info!(database = %config.database, "document store client initialized");
    Ok(client.database(&config.database))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_parses_valid_url() {
        let config = StoreConfig {
            url: "mongodb://localhost:27017".to_string(),
            database: "taskdock_test".to_string(),
        };

        // Connection establishment is lazy, so this succeeds without a server.
        let db = connect(&config).await.expect("Should build client");
        assert_eq!(db.name(), "taskdock_test");
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let config = StoreConfig {
            url: "not-a-connection-string".to_string(),
            database: "taskdock_test".to_string(),
        };

        assert!(connect(&config).await.is_err());
    }
}
