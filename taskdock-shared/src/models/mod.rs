//! Typed persisted models
//!
//! One static schema type per resource: validation happens once at the
//! boundary and everything past it operates on the typed form, never on an
//! untyped map.
//!
//! # Models
//!
//! - `user`: user accounts with role and audit fields
//! - `task`: tasks owned by the user who created them

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod task;
pub mod user;

/// A model the generic service layer can persist
///
/// `COLLECTION` names the backing store collection; `RESOURCE` is the plural
/// resource name used in error tags (`users/warning/not-found`).
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Unpin {
    const COLLECTION: &'static str;
    const RESOURCE: &'static str;
}
