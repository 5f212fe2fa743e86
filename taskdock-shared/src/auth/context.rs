//! Request-scoped caller context
//!
//! The access control gate resolves identity and role from the bearer token
//! once, before the handler runs, and binds the result into an immutable
//! [`RequestContext`] value. Handlers and services receive it as an explicit
//! parameter — never through shared mutable state.

use crate::models::user::UserRole;

/// Immutable caller identity resolved by the access control gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user's id; None on public endpoints
    pub user_id: Option<String>,

    /// Authenticated user's role; None on public endpoints
    pub user_role: Option<UserRole>,

    /// Whether the request carried a validated token
    pub is_authenticated: bool,
}

impl RequestContext {
    /// Context for a request that passed token validation
    pub fn authenticated(user_id: String, user_role: UserRole) -> Self {
        Self {
            user_id: Some(user_id),
            user_role: Some(user_role),
            is_authenticated: true,
        }
    }

    /// Context for a public endpoint; caller identity unset
    pub fn public() -> Self {
        Self {
            user_id: None,
            user_role: None,
            is_authenticated: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_role == Some(UserRole::Admin)
    }

    /// The caller's id, or an empty string on public requests
    ///
    /// Only meaningful behind the gate; audit stamps use it.
    pub fn user_id_str(&self) -> &str {
        self.user_id.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_context() {
        let ctx = RequestContext::authenticated("user-1".to_string(), UserRole::Admin);
        assert!(ctx.is_authenticated);
        assert!(ctx.is_admin());
        assert_eq!(ctx.user_id_str(), "user-1");
    }

    #[test]
    fn test_public_context() {
        let ctx = RequestContext::public();
        assert!(!ctx.is_authenticated);
        assert!(!ctx.is_admin());
        assert_eq!(ctx.user_id_str(), "");
    }

    #[test]
    fn test_regular_user_is_not_admin() {
        let ctx = RequestContext::authenticated("user-1".to_string(), UserRole::User);
        assert!(!ctx.is_admin());
    }
}
