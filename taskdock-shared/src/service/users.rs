//! User domain service
//!
//! Thin wrapper over [`BaseService<User>`](super::BaseService) adding the
//! account lifecycle: registration with email uniqueness, login, profile
//! edits, role promotion and the default-admin bootstrap.

use bson::doc;
use bson::ser::serialize_to_document;
use mongodb::Database;
use tracing::info;

use crate::auth::context::RequestContext;
use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::models::user::{User, UserRole};
use crate::validate;

use super::{BaseService, UpdateOptions};

/// Validated registration input
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Partial profile update
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct UserEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserService {
    base: BaseService<User>,
    min_password_length: usize,
}

impl UserService {
    pub fn new(db: &Database, ownership_field: Option<String>, min_password_length: usize) -> Self {
        Self {
            base: BaseService::new(db, ownership_field),
            min_password_length,
        }
    }

    /// The underlying generic service, for plain CRUD calls
    pub fn base(&self) -> &BaseService<User> {
        &self.base
    }

    pub async fn try_get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.base.try_get_by_field(email, "email", false, None).await
    }

    /// Registers a new account; the role always starts as `user`
    ///
    /// After the unique insert, `created_by` is back-filled with the user's
    /// own id so ownership scoping covers the record itself.
    pub async fn register(&self, data: RegisterData) -> AppResult<User> {
        validate::check_password_length(&data.password, self.min_password_length)?;
        validate::check_email(&data.email)?;
        if let Some(phone) = &data.phone {
            validate::check_phone(phone)?;
        }

        let hashed = password::hash_password(&data.password)?;
        let user = User::from_register(data.fullname, data.email, data.phone, hashed);
        let user = self.base.save_unique(&user, &["email"]).await?;

        let id = user.id_str().to_string();
        self.base
            .update_by_id(
                &id,
                doc! { "created_by": id.as_str() },
                UpdateOptions {
                    check_modified: false,
                    ..Default::default()
                },
            )
            .await
    }

    /// Verifies credentials and returns the account
    ///
    /// Unknown email and wrong password fail identically, so the error shape
    /// leaks nothing about which one it was.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .try_get_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !password::verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }

    /// Applies a profile edit with audit stamping
    pub async fn edit(&self, id: &str, data: UserEdit, ctx: &RequestContext) -> AppResult<User> {
        if let Some(phone) = &data.phone {
            validate::check_phone(phone)?;
        }

        let mut changes = serialize_to_document(&data)?;
        changes.insert("updated_at", bson::DateTime::now());
        changes.insert("updated_by", ctx.user_id_str());

        self.base
            .update_by_id(
                id,
                changes,
                UpdateOptions {
                    ctx: Some(ctx),
                    ..Default::default()
                },
            )
            .await
    }

    /// Promotes an account to `admin`
    pub async fn grant_admin(
        &self,
        id: &str,
        ctx: Option<&RequestContext>,
    ) -> AppResult<User> {
        let mut changes = doc! {
            "type": UserRole::Admin.as_str(),
            "updated_at": bson::DateTime::now(),
        };
        if let Some(updated_by) = ctx.and_then(|c| c.user_id.as_deref()) {
            changes.insert("updated_by", updated_by);
        }

        self.base
            .update_by_id(
                id,
                changes,
                UpdateOptions {
                    ctx,
                    ..Default::default()
                },
            )
            .await
    }

    /// Bootstrap routine: makes sure the default admin account exists
    ///
    /// Returns the existing account untouched when the email is already
    /// registered; otherwise registers it and promotes it to admin.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<User> {
        if let Some(existing) = self.try_get_by_email(email).await? {
            return Ok(existing);
        }

        let admin = self
            .register(RegisterData {
                fullname: "Admin".to_string(),
                email: email.to_string(),
                phone: None,
                password: password.to_string(),
            })
            .await?;
        let admin = self.grant_admin(admin.id_str(), None).await?;

        info!(email = %admin.email, "default admin account created");
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_edit_skips_unset_fields() {
        let empty = serialize_to_document(&UserEdit::default()).unwrap();
        assert!(empty.is_empty());

        let edit = UserEdit {
            fullname: Some("New Name".to_string()),
            phone: None,
        };
        let document = serialize_to_document(&edit).unwrap();
        assert_eq!(document.get_str("fullname").unwrap(), "New Name");
        assert!(!document.contains_key("phone"));
    }
}
