//! Database layer
//!
//! # Modules
//!
//! - `client`: MongoDB client construction (built once, passed by reference)
//! - `crud`: the document-store adapter wrapping a single collection

pub mod client;
pub mod crud;
