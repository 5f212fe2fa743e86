//! Middleware for the API server
//!
//! - `auth`: the access control gate (authentication + admin requirement)

pub mod auth;
