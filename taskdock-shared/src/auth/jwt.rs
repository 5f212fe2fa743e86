//! Bearer token issuing and validation
//!
//! Tokens carry `{user_id, user_role, exp}` and are signed with the
//! configured secret and algorithm. Lifetime is a configured number of days;
//! there is no revocation — a token stays valid until its natural expiry.
//!
//! Validation deliberately collapses every failure (malformed token, bad
//! signature, expired, missing claims) into the single `Unauthorized` error
//! so callers cannot be used as an oracle.
//!
//! # Example
//!
//! ```
//! use taskdock_shared::auth::jwt::{issue_token, validate_token, JwtConfig};
//! use taskdock_shared::models::user::UserRole;
//!
//! # fn example() -> Result<(), taskdock_shared::error::AppError> {
//! let config = JwtConfig {
//!     secret: "test-secret-key-at-least-32-bytes-long".to_string(),
//!     algorithm: "HS256".to_string(),
//!     expire_days: 3,
//! };
//!
//! let token = issue_token("64b2f7a59c8d3e0012345678", UserRole::User, &config)?;
//! let claims = validate_token(&token, &config)?;
//! assert_eq!(claims.user_id, "64b2f7a59c8d3e0012345678");
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::user::UserRole;

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret; should be at least 32 bytes
    pub secret: String,

    /// Named signing algorithm (e.g. "HS256")
    pub algorithm: String,

    /// Token lifetime in days
    pub expire_days: i64,
}

/// Claim set carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject user id
    pub user_id: String,

    /// Role at issue time
    pub user_role: UserRole,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issues a signed access token for the given user
pub fn issue_token(user_id: &str, user_role: UserRole, config: &JwtConfig) -> AppResult<String> {
    let algorithm = parse_algorithm(&config.algorithm)?;
    let expires_at = Utc::now() + Duration::days(config.expire_days);

    let claims = AccessClaims {
        user_id: user_id.to_string(),
        user_role,
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
}

/// Validates a token and returns its claims
///
/// Verifies signature, algorithm and expiry; a claim set without a user id
/// does not deserialize and is rejected the same way. All failures surface
/// as `Unauthorized` with no further detail.
pub fn validate_token(token: &str, config: &JwtConfig) -> AppResult<AccessClaims> {
    let algorithm = parse_algorithm(&config.algorithm).map_err(|_| AppError::Unauthorized)?;
    let validation = Validation::new(algorithm);

    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

fn parse_algorithm(name: &str) -> AppResult<Algorithm> {
    Algorithm::from_str(name)
        .map_err(|_| AppError::Internal(format!("unsupported token algorithm: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            algorithm: "HS256".to_string(),
            expire_days: 3,
        }
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let config = test_config();
        let token = issue_token("user-1", UserRole::Admin, &config).expect("Should issue");

        let claims = validate_token(&token, &config).expect("Should validate");
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.user_role, UserRole::Admin);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let config = test_config();
        let token = issue_token("user-1", UserRole::User, &config).unwrap();

        let other = JwtConfig {
            secret: "a-different-secret-that-is-also-32-bytes".to_string(),
            ..config
        };
        let result = validate_token(&token, &other);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_validate_expired_token() {
        // Negative lifetime puts exp well past the validator's leeway.
        let config = JwtConfig {
            expire_days: -2,
            ..test_config()
        };
        let token = issue_token("user-1", UserRole::User, &config).unwrap();

        let result = validate_token(&token, &config);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_validate_garbage_token() {
        let config = test_config();
        assert!(matches!(
            validate_token("definitely.not.a-token", &config),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            validate_token("", &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_validate_rejects_missing_user_id() {
        #[derive(Serialize)]
        struct BareClaims {
            exp: i64,
        }

        let config = test_config();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &BareClaims {
                exp: (Utc::now() + Duration::days(1)).timestamp(),
            },
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let result = validate_token(&token, &config);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_unknown_algorithm_name() {
        let config = JwtConfig {
            algorithm: "HS999".to_string(),
            ..test_config()
        };
        assert!(issue_token("user-1", UserRole::User, &config).is_err());
        assert!(matches!(
            validate_token("whatever", &config),
            Err(AppError::Unauthorized)
        ));
    }
}
