//! # Taskdock Shared Library
//!
//! Domain layer of taskdock: everything below the HTTP surface.
//!
//! ## Module Organization
//!
//! - `db`: document-store client and the generic CRUD adapter
//! - `service`: the generic service layer plus the user/task domain services
//! - `models`: typed persisted models
//! - `auth`: password hashing, bearer tokens, request context
//! - `validate`: input format checks
//! - `error`: the structured error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod validate;

/// Current version of the taskdock shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
