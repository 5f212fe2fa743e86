//! User model
//!
//! Users carry the full audit field set (`created_*`, `updated_*`,
//! `deleted_*`) plus a role that drives access control decisions. Passwords
//! are stored as Argon2id hashes, never in plaintext.
//!
//! The `created_by` field is back-filled with the user's own id right after
//! registration, so ownership scoping covers the user record itself.

use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::Model;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

/// A persisted user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier (hex string); None until inserted
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub fullname: String,

    /// Unique across all active users (enforced by the service layer)
    pub email: String,

    /// Argon2id password hash in PHC string format
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "type")]
    pub role: UserRole,

    pub created_at: DateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,

    /// None means the record is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl User {
    /// Builds a user from registration input; role defaults to `user`
    pub fn from_register(
        fullname: String,
        email: String,
        phone: Option<String>,
        hashed_password: String,
    ) -> Self {
        Self {
            id: None,
            fullname,
            email,
            password: hashed_password,
            phone,
            role: UserRole::User,
            created_at: DateTime::now(),
            created_by: None,
            updated_at: None,
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// The store-assigned id; empty string when the user was never inserted
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

impl Model for User {
    const COLLECTION: &'static str = "users";
    const RESOURCE: &'static str = "users";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&UserRole::User).unwrap(), "\"user\"");
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_from_register_defaults() {
        let user = User::from_register(
            "A".to_string(),
            "a@x.com".to_string(),
            None,
            "$argon2id$stub".to_string(),
        );

        assert_eq!(user.role, UserRole::User);
        assert!(user.id.is_none());
        assert!(user.created_by.is_none());
        assert!(user.deleted_at.is_none());
    }

    #[test]
    fn test_bson_roundtrip() {
        let user = User::from_register(
            "A".to_string(),
            "a@x.com".to_string(),
            Some("0123456789".to_string()),
            "$argon2id$stub".to_string(),
        );

        let document = bson::ser::serialize_to_document(&user).expect("Should serialize");
        // Unset optional fields must not appear in the stored document.
        assert!(!document.contains_key("_id"));
        assert!(!document.contains_key("deleted_at"));
        assert_eq!(document.get_str("type").unwrap(), "user");

        let back: User =
            bson::de::deserialize_from_document(document).expect("Should deserialize");
        assert_eq!(back.email, user.email);
        assert_eq!(back.role, UserRole::User);
    }
}
