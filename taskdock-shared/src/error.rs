//! Structured error taxonomy shared by every layer
//!
//! Every failure the service layer can raise maps 1:1 to a stable
//! machine-readable `type` tag plus an HTTP-style status, so clients can
//! branch on `type` without parsing prose. Errors propagate uncaught via `?`
//! through the service and handler layers; the api crate owns the single
//! point where they are rendered into a transport response.

use thiserror::Error;

/// Result type used throughout the shared crate
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error
///
/// The `resource` field on the record-level variants is the plural resource
/// name (`users`, `tasks`) carried by the service that raised the error; it
/// ends up in the error `type` tag, e.g. `users/warning/not-found`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Lookup by id/field yielded nothing (404)
    #[error("{resource} with {item} could not be found")]
    NotFound { resource: String, item: String },

    /// An update carried no actual changes (304)
    #[error("content has not changed since the last request, no update needed")]
    NotModified { resource: String },

    /// A uniqueness constraint would be violated (409)
    #[error("the {item} data already exists, please provide other data and try again")]
    Conflict { resource: String, item: String },

    /// Identifier is not a well-formed document id (400)
    #[error("the id {id} is not a valid document id")]
    InvalidId { id: String },

    /// Email fails the format check (400)
    #[error("the {email} is not a valid email address")]
    InvalidEmail { email: String },

    /// Phone number fails the format check (400)
    #[error("the {phone} is not a valid phone number, provide 10 digits")]
    InvalidPhone { phone: String },

    /// Date string fails the YYYY-MM-DD format check (400)
    #[error("the {date} is not a valid date, use the YYYY-MM-DD format")]
    InvalidDate { date: String },

    /// Password shorter than the configured minimum (400)
    #[error("the password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    /// Missing/invalid/expired bearer token (401)
    ///
    /// Deliberately carries no detail about which check failed.
    #[error("could not authorize credentials")]
    Unauthorized,

    /// Valid token but insufficient role (403)
    #[error("you do not have permission to access this resource")]
    Forbidden,

    /// Store-level failure (500)
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// BSON (de)serialization failure (500)
    #[error("serialization error: {0}")]
    Serialization(#[from] bson::error::Error),

    /// Anything else unexpected (500)
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error renders as
    pub fn status(&self) -> u16 {
        match self {
            AppError::NotFound { .. } => 404,
            AppError::NotModified { .. } => 304,
            AppError::Conflict { .. } => 409,
            AppError::InvalidId { .. }
            | AppError::InvalidEmail { .. }
            | AppError::InvalidPhone { .. }
            | AppError::InvalidDate { .. }
            | AppError::PasswordTooShort { .. } => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden => 403,
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable error tag
    pub fn kind(&self) -> String {
        match self {
            AppError::NotFound { resource, .. } => format!("{resource}/warning/not-found"),
            AppError::NotModified { resource } => format!("{resource}/warning/not-modified"),
            AppError::Conflict { resource, .. } => format!("{resource}/warning/conflict"),
            AppError::InvalidId { .. } => "core/info/invalid-id".to_string(),
            AppError::InvalidEmail { .. } => "core/info/invalid-email".to_string(),
            AppError::InvalidPhone { .. } => "core/info/invalid-phone".to_string(),
            AppError::InvalidDate { .. } => "core/info/invalid-date".to_string(),
            AppError::PasswordTooShort { .. } => "users/info/invalid-password-length".to_string(),
            AppError::Unauthorized => "core/warning/unauthorized".to_string(),
            AppError::Forbidden => "core/warning/forbidden".to_string(),
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                "core/error/internal".to_string()
            }
        }
    }

    /// Short human title
    pub fn title(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "Not found.",
            AppError::NotModified { .. } => "Not modified.",
            AppError::Conflict { .. } => "Conflict.",
            AppError::InvalidId { .. } => "Invalid id format.",
            AppError::InvalidEmail { .. } => "Invalid email format.",
            AppError::InvalidPhone { .. } => "Invalid phone format.",
            AppError::InvalidDate { .. } => "Invalid date format.",
            AppError::PasswordTooShort { .. } => "Invalid password length.",
            AppError::Unauthorized => "Unauthorized.",
            AppError::Forbidden => "Forbidden.",
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                "Something went wrong."
            }
        }
    }

    /// Convenience constructor for record-level not-found
    pub fn not_found(resource: &str, item: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: resource.to_string(),
            item: item.into(),
        }
    }

    /// Convenience constructor for uniqueness conflicts
    pub fn conflict(resource: &str, item: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.to_string(),
            item: item.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::not_found("users", "abc").status(), 404);
        assert_eq!(
            AppError::NotModified {
                resource: "tasks".to_string()
            }
            .status(),
            304
        );
        assert_eq!(AppError::conflict("users", "a@x.com").status(), 409);
        assert_eq!(
            AppError::InvalidId {
                id: "zzz".to_string()
            }
            .status(),
            400
        );
        assert_eq!(AppError::Unauthorized.status(), 401);
        assert_eq!(AppError::Forbidden.status(), 403);
        assert_eq!(AppError::Internal("boom".to_string()).status(), 500);
    }

    #[test]
    fn test_kind_carries_resource_name() {
        assert_eq!(
            AppError::not_found("users", "abc").kind(),
            "users/warning/not-found"
        );
        assert_eq!(
            AppError::conflict("tasks", "dup").kind(),
            "tasks/warning/conflict"
        );
        assert_eq!(AppError::Unauthorized.kind(), "core/warning/unauthorized");
    }

    #[test]
    fn test_display_names_the_item() {
        let err = AppError::not_found("users", "64b2");
        assert_eq!(err.to_string(), "users with 64b2 could not be found");

        let err = AppError::conflict("users", "a@x.com");
        assert!(err.to_string().contains("a@x.com"));
    }

    #[test]
    fn test_unauthorized_is_detail_free() {
        // Wrong password and unknown email must be indistinguishable.
        assert_eq!(
            AppError::Unauthorized.to_string(),
            "could not authorize credentials"
        );
    }
}
