//! Configuration management for the API server
//!
//! Loads configuration from environment variables into a type-safe struct.
//!
//! # Environment Variables
//!
//! - `API_HOST`: host to bind to (default: 0.0.0.0)
//! - `API_PORT`: port to bind to (default: 8080)
//! - `DATABASE_URL`: MongoDB connection string (required)
//! - `DATABASE_NAME`: database name (default: taskdock)
//! - `JWT_SECRET`: token signing secret, at least 32 chars (required)
//! - `JWT_ALGORITHM`: signing algorithm name (default: HS256)
//! - `ACCESS_TOKEN_EXPIRE_DAYS`: token lifetime (default: 3)
//! - `MIN_PASSWORD_LENGTH`: registration password floor (default: 8)
//! - `DEFAULT_ADMIN_EMAIL` / `DEFAULT_ADMIN_PASSWORD`: bootstrap admin (required)
//! - `OWNERSHIP_FIELD`: record attribute scoping visibility (default: created_by)
//! - `CORS_ORIGINS`: comma-separated allowed origins, `*` for permissive (default: *)
//! - `RUST_LOG`: log level filter

use std::env;

use taskdock_shared::auth::jwt::JwtConfig;
use taskdock_shared::db::client::StoreConfig;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Document store configuration
    pub database: StoreConfig,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Account policy configuration
    pub auth: AuthConfig,

    /// Record attribute used for ownership scoping
    pub ownership_field: String,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,
}

/// Account policy configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Minimum accepted password length at registration
    pub min_password_length: usize,

    /// Email of the bootstrap admin account
    pub default_admin_email: String,

    /// Password of the bootstrap admin account
    pub default_admin_password: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric variable
    /// does not parse, or the JWT secret is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let database_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "taskdock".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        let jwt_algorithm = env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string());
        let expire_days = env::var("ACCESS_TOKEN_EXPIRE_DAYS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<i64>()?;

        let min_password_length = env::var("MIN_PASSWORD_LENGTH")
            .unwrap_or_else(|_| "8".to_string())
            .parse::<usize>()?;
        let default_admin_email = env::var("DEFAULT_ADMIN_EMAIL")
            .map_err(|_| anyhow::anyhow!("DEFAULT_ADMIN_EMAIL environment variable is required"))?;
        let default_admin_password = env::var("DEFAULT_ADMIN_PASSWORD").map_err(|_| {
            anyhow::anyhow!("DEFAULT_ADMIN_PASSWORD environment variable is required")
        })?;

        let ownership_field =
            env::var("OWNERSHIP_FIELD").unwrap_or_else(|_| "created_by".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: StoreConfig {
                url: database_url,
                database: database_name,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                algorithm: jwt_algorithm,
                expire_days,
            },
            auth: AuthConfig {
                min_password_length,
                default_admin_email,
                default_admin_password,
            },
            ownership_field,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
