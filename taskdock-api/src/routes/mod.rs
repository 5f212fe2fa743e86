//! API route handlers
//!
//! - `health`: liveness endpoint
//! - `users`: registration, login, self-service and admin user management
//! - `tasks`: task CRUD, ownership-scoped
//!
//! This module also holds the request/response pieces shared across
//! resources: the pagination query parameters and the list response wrapper.

use std::collections::HashMap;

use bson::Document;
use serde::{Deserialize, Serialize};

use taskdock_shared::db::crud::{ListQuery, SortOrder};

pub mod health;
pub mod tasks;
pub mod users;

/// Pagination/sorting/search query parameters common to list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    pub search: Option<String>,

    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Comma-separated projection; when present, results bypass the typed
    /// response schema
    pub fields: Option<String>,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default = "default_order_by")]
    pub order_by: String,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> i64 {
    20
}

fn default_sort_by() -> String {
    "created_at".to_string()
}

fn default_order_by() -> String {
    "desc".to_string()
}

impl PaginationParams {
    /// Combines the typed parameters with the raw query map into a listing
    ///
    /// The raw map still carries the reserved pagination keys; the adapter
    /// strips them before filtering.
    pub fn into_query(self, raw_params: HashMap<String, String>, search_fields: &[&str]) -> ListQuery {
        let mut filter = Document::new();
        for (key, value) in raw_params {
            filter.insert(key, value);
        }

        ListQuery {
            filter,
            search: self.search,
            search_fields: search_fields.iter().map(|field| field.to_string()).collect(),
            page: Some(self.page),
            limit: Some(self.limit),
            fields: self.fields,
            sort_by: Some(self.sort_by),
            order: SortOrder::from_param(&self.order_by),
        }
    }
}

/// Optional projection parameter for detail endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct FieldsParam {
    pub fields: Option<String>,
}

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub total_items: u64,
    pub total_pages: u64,
    pub records_per_page: usize,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 20);
        assert_eq!(params.sort_by, "created_at");
        assert_eq!(params.order_by, "desc");
        assert!(params.search.is_none());
        assert!(params.fields.is_none());
    }

    #[test]
    fn test_into_query_carries_raw_filter() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": 2, "limit": 5, "search": "report"}"#).unwrap();
        let raw = HashMap::from([
            ("status".to_string(), "to_do".to_string()),
            ("page".to_string(), "2".to_string()),
        ]);

        let query = params.into_query(raw, &["summary"]);
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.search.as_deref(), Some("report"));
        assert_eq!(query.search_fields, vec!["summary".to_string()]);
        // Raw params go through untouched; the adapter strips reserved keys.
        assert!(query.filter.contains_key("status"));
        assert!(query.filter.contains_key("page"));
        assert_eq!(query.order, SortOrder::Desc);
    }
}
