//! Generic service layer
//!
//! [`BaseService<M>`] imposes the domain-agnostic business rules on top of
//! the document-store adapter, parameterized by a typed model and an optional
//! ownership field:
//!
//! - soft delete: reads exclude records with a `deleted_at` timestamp unless
//!   explicitly asked otherwise
//! - ownership scoping: non-admin callers only see records whose ownership
//!   field matches their id; admins are unrestricted
//! - uniqueness enforcement with friendly `Conflict` errors
//! - modified-detection on partial updates (audit fields excluded)
//! - save-then-refetch so returned records always reflect store-side state
//!
//! One generic implementation serves every resource; the per-domain services
//! in [`users`] and [`tasks`] are thin wrappers over it.
//!
//! Ignore-error mode from the operation contracts is rendered as paired
//! methods: `get_by_id` fails with `NotFound` where `try_get_by_id` returns
//! `Ok(None)`, and likewise for `get_by_field`, `save_unique`, `update_by_id`
//! and the delete operations.

use std::marker::PhantomData;

use bson::de::deserialize_from_document;
use bson::ser::serialize_to_document;
use bson::{doc, Bson, Document};
use mongodb::Database;

use crate::auth::context::RequestContext;
use crate::db::crud::{parse_object_id, Crud, ListQuery, Paginated};
use crate::error::{AppError, AppResult};
use crate::models::Model;

pub mod tasks;
pub mod users;

/// Audit fields excluded from modified-detection
const AUDIT_FIELDS: [&str; 2] = ["updated_at", "updated_by"];

/// Options for [`BaseService::update_by_id`]
#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions<'a> {
    /// Fields to re-check for uniqueness before applying the update
    pub unique_fields: &'a [&'a str],

    /// Whether to fail with `NotModified` when nothing actually changes
    pub check_modified: bool,

    /// Whether the record may be soft-deleted at update time
    pub include_deleted: bool,

    /// Caller context for ownership scoping of the pre-update fetch
    pub ctx: Option<&'a RequestContext>,
}

impl Default for UpdateOptions<'_> {
    fn default() -> Self {
        Self {
            unique_fields: &[],
            check_modified: true,
            include_deleted: false,
            ctx: None,
        }
    }
}

/// Domain-agnostic CRUD service over one model type
#[derive(Debug, Clone)]
pub struct BaseService<M: Model> {
    crud: Crud,
    ownership_field: Option<String>,
    _model: PhantomData<M>,
}

impl<M: Model> BaseService<M> {
    /// Builds a service over the model's collection
    ///
    /// `ownership_field` names the record attribute that scopes visibility to
    /// the creator; `None` disables ownership filtering for this resource.
    pub fn new(db: &Database, ownership_field: Option<String>) -> Self {
        Self {
            crud: Crud::new(db, M::COLLECTION),
            ownership_field,
            _model: PhantomData,
        }
    }

    /// Base filter every read starts from: active records only (unless
    /// `include_deleted`) plus the caller's ownership scope
    fn scope(&self, include_deleted: bool, ctx: Option<&RequestContext>) -> Document {
        let mut filter = Document::new();
        if !include_deleted {
            filter.insert("deleted_at", Bson::Null);
        }
        if let Some(ownership) = self.ownership_filter(ctx) {
            filter.extend(ownership);
        }
        filter
    }

    /// Ownership scope for the caller; None means unrestricted
    ///
    /// No context or no caller id → no filter (internal call). Admin → no
    /// filter. Anyone else is pinned to their own records. The filter only
    /// ever narrows reads — it never changes what gets written.
    fn ownership_filter(&self, ctx: Option<&RequestContext>) -> Option<Document> {
        let ctx = ctx?;
        let user_id = ctx.user_id.as_ref()?;
        if ctx.is_admin() {
            return None;
        }
        let field = self.ownership_field.as_ref()?;
        Some(doc! { field.as_str(): user_id.as_str() })
    }

    fn to_model(&self, document: Document) -> AppResult<M> {
        Ok(deserialize_from_document(document)?)
    }

    /// Fetches a record by id, `Ok(None)` when absent
    pub async fn try_get_by_id(
        &self,
        id: &str,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<Option<M>> {
        let document = self
            .crud
            .get_by_id(id, None, self.scope(include_deleted, ctx))
            .await?;
        document.map(|d| self.to_model(d)).transpose()
    }

    /// Fetches a record by id, failing with `NotFound` when absent
    pub async fn get_by_id(
        &self,
        id: &str,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<M> {
        self.try_get_by_id(id, include_deleted, ctx)
            .await?
            .ok_or_else(|| AppError::not_found(M::RESOURCE, id))
    }

    /// Raw by-id fetch with an optional field projection
    ///
    /// Used when the caller requested a `fields` projection and the result
    /// bypasses the typed schema.
    pub async fn find_raw_by_id(
        &self,
        id: &str,
        fields_limit: Option<&str>,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<Option<Document>> {
        self.crud
            .get_by_id(id, fields_limit, self.scope(include_deleted, ctx))
            .await
    }

    /// First record where `field_name` equals `value`, `Ok(None)` when absent
    pub async fn try_get_by_field(
        &self,
        value: &str,
        field_name: &str,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<Option<M>> {
        let document = self
            .crud
            .get_by_field(value, field_name, None, self.scope(include_deleted, ctx))
            .await?;
        document.map(|d| self.to_model(d)).transpose()
    }

    /// First record where `field_name` equals `value`, failing with `NotFound`
    pub async fn get_by_field(
        &self,
        value: &str,
        field_name: &str,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<M> {
        self.try_get_by_field(value, field_name, include_deleted, ctx)
            .await?
            .ok_or_else(|| AppError::not_found(M::RESOURCE, value))
    }

    /// Paginated typed listing
    pub async fn list(
        &self,
        mut query: ListQuery,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<Paginated<M>> {
        // Typed results need the full document.
        query.fields = None;
        let page = self.list_raw(query, include_deleted, ctx).await?;

        let mut results = Vec::with_capacity(page.results.len());
        for document in page.results {
            results.push(self.to_model(document)?);
        }
        Ok(Paginated {
            total_items: page.total_items,
            total_pages: page.total_pages,
            records_per_page: page.records_per_page,
            results,
        })
    }

    /// Paginated raw listing, projection-capable
    pub async fn list_raw(
        &self,
        mut query: ListQuery,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<Paginated<Document>> {
        query.filter.extend(self.scope(include_deleted, ctx));
        self.crud.get_all(query).await
    }

    /// Inserts a record, then re-fetches it by id
    ///
    /// The refetch guarantees the returned record reflects store-side
    /// defaults and the assigned identifier.
    pub async fn save(&self, model: &M) -> AppResult<M> {
        let document = serialize_to_document(model)?;
        let id = self.crud.save(document).await?;
        self.get_by_id(&id, false, None).await
    }

    /// Inserts records in bulk, re-fetching each by id
    pub async fn save_many(&self, models: &[M]) -> AppResult<Vec<M>> {
        let mut documents = Vec::with_capacity(models.len());
        for model in models {
            documents.push(serialize_to_document(model)?);
        }
        let ids = self.crud.save_many(documents).await?;

        let mut results = Vec::with_capacity(ids.len());
        for id in &ids {
            results.push(self.get_by_id(id, false, None).await?);
        }
        Ok(results)
    }

    /// Inserts a record unless the unique fields collide with an existing one
    ///
    /// Fails with `Conflict` naming the first unique value. The existence
    /// check and the insert are not atomic (see DESIGN.md).
    pub async fn save_unique(&self, model: &M, unique_fields: &[&str]) -> AppResult<M> {
        let document = serialize_to_document(model)?;
        let conflict_item = first_unique_value(&document, unique_fields);

        match self.crud.save_unique(document, unique_fields).await? {
            Some(id) => self.get_by_id(&id, false, None).await,
            None => Err(AppError::conflict(M::RESOURCE, conflict_item)),
        }
    }

    /// Like [`save_unique`](Self::save_unique) but a duplicate yields `Ok(None)`
    pub async fn try_save_unique(
        &self,
        model: &M,
        unique_fields: &[&str],
    ) -> AppResult<Option<M>> {
        match self.save_unique(model, unique_fields).await {
            Ok(saved) => Ok(Some(saved)),
            Err(AppError::Conflict { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Applies a partial update to a record
    ///
    /// 1. fetches the current record (`NotFound` when absent or out of scope)
    /// 2. with `check_modified`, compares every change against the current
    ///    values, audit fields excluded — `NotModified` when nothing differs
    /// 3. with `unique_fields`, re-runs the uniqueness check across the
    ///    collection, excluding the record itself
    /// 4. applies the `$set`, then re-fetches including soft-deleted state so
    ///    the just-updated record is always visible
    pub async fn update_by_id(
        &self,
        id: &str,
        changes: Document,
        opts: UpdateOptions<'_>,
    ) -> AppResult<M> {
        let current = self
            .crud
            .get_by_id(id, None, self.scope(opts.include_deleted, opts.ctx))
            .await?
            .ok_or_else(|| AppError::not_found(M::RESOURCE, id))?;

        if opts.check_modified && !is_modified(&current, &changes) {
            return Err(AppError::NotModified {
                resource: M::RESOURCE.to_string(),
            });
        }
        if !opts.unique_fields.is_empty() {
            self.check_unique_excluding(&changes, opts.unique_fields, id)
                .await?;
        }

        self.crud.update_by_id(id, changes).await?;
        self.get_by_id(id, true, None).await
    }

    /// Like [`update_by_id`](Self::update_by_id) but suppresses the expected
    /// failures: `NotFound`, `NotModified` and `Conflict` become `Ok(None)`
    pub async fn try_update_by_id(
        &self,
        id: &str,
        changes: Document,
        opts: UpdateOptions<'_>,
    ) -> AppResult<Option<M>> {
        match self.update_by_id(id, changes, opts).await {
            Ok(model) => Ok(Some(model)),
            Err(AppError::NotFound { .. })
            | Err(AppError::NotModified { .. })
            | Err(AppError::Conflict { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Permanently deletes a record
    ///
    /// Verifies existence (and scope) first; fails with `NotFound` when the
    /// delete itself reports no effect.
    pub async fn hard_delete_by_id(
        &self,
        id: &str,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<()> {
        self.get_by_id(id, include_deleted, ctx).await?;
        if !self.crud.delete_by_id(id).await? {
            return Err(AppError::not_found(M::RESOURCE, id));
        }
        Ok(())
    }

    /// Marks a record deleted by stamping `deleted_at`/`deleted_by`
    ///
    /// A second soft delete finds nothing (the record is out of the active
    /// scope) and fails with `NotFound`.
    pub async fn soft_delete_by_id(
        &self,
        id: &str,
        ctx: Option<&RequestContext>,
    ) -> AppResult<M> {
        let deleted_by = ctx
            .and_then(|c| c.user_id.clone())
            .map(Bson::String)
            .unwrap_or(Bson::Null);
        let changes = doc! {
            "deleted_at": bson::DateTime::now(),
            "deleted_by": deleted_by,
        };
        self.update_by_id(
            id,
            changes,
            UpdateOptions {
                check_modified: false,
                ctx,
                ..Default::default()
            },
        )
        .await
    }

    /// Like [`hard_delete_by_id`](Self::hard_delete_by_id) but an absent
    /// record yields `Ok(false)`
    pub async fn try_hard_delete_by_id(
        &self,
        id: &str,
        include_deleted: bool,
        ctx: Option<&RequestContext>,
    ) -> AppResult<bool> {
        match self.hard_delete_by_id(id, include_deleted, ctx).await {
            Ok(()) => Ok(true),
            Err(AppError::NotFound { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Like [`soft_delete_by_id`](Self::soft_delete_by_id) but an absent
    /// record yields `Ok(None)`
    pub async fn try_soft_delete_by_id(
        &self,
        id: &str,
        ctx: Option<&RequestContext>,
    ) -> AppResult<Option<M>> {
        match self.soft_delete_by_id(id, ctx).await {
            Ok(deleted) => Ok(Some(deleted)),
            Err(AppError::NotFound { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Uniqueness scan over the whole collection, excluding the record under
    /// update so an unchanged unique field never conflicts with itself
    async fn check_unique_excluding(
        &self,
        changes: &Document,
        unique_fields: &[&str],
        exclude_id: &str,
    ) -> AppResult<()> {
        let mut query = Document::new();
        for field in unique_fields {
            if let Some(value) = changes.get(*field) {
                query.insert(*field, value.clone());
            }
        }
        if query.is_empty() {
            return Ok(());
        }
        let conflict_item = first_unique_value(&query, unique_fields);

        let object_id = parse_object_id(exclude_id)?;
        query.insert("_id", doc! { "$ne": object_id });

        if self.crud.count_documents(query).await? > 0 {
            return Err(AppError::conflict(M::RESOURCE, conflict_item));
        }
        Ok(())
    }
}

/// True when any non-audit change differs from the current value
fn is_modified(current: &Document, changes: &Document) -> bool {
    changes.iter().any(|(key, value)| {
        if AUDIT_FIELDS.contains(&key.as_str()) {
            return false;
        }
        current.get(key) != Some(value)
    })
}

/// The first unique value present in the document, for conflict messages
fn first_unique_value(document: &Document, unique_fields: &[&str]) -> String {
    unique_fields
        .iter()
        .find_map(|field| document.get(*field))
        .map(display_value)
        .unwrap_or_default()
}

fn display_value(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Task;
    use crate::models::user::UserRole;

    async fn test_service(ownership_field: Option<&str>) -> BaseService<Task> {
        // The driver connects lazily, so building a handle needs no server.
        let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
            .await
            .expect("Should build client");
        let db = client.database("taskdock_test");
        BaseService::new(&db, ownership_field.map(str::to_string))
    }

    #[test]
    fn test_is_modified_detects_changes() {
        let current = doc! { "summary": "a", "status": "to_do" };

        assert!(is_modified(&current, &doc! { "summary": "b" }));
        assert!(is_modified(&current, &doc! { "description": "new field" }));
        assert!(!is_modified(&current, &doc! { "summary": "a", "status": "to_do" }));
    }

    #[test]
    fn test_is_modified_ignores_audit_fields() {
        let current = doc! { "summary": "a" };
        let changes = doc! {
            "summary": "a",
            "updated_at": bson::DateTime::now(),
            "updated_by": "someone",
        };
        assert!(!is_modified(&current, &changes));
    }

    #[test]
    fn test_first_unique_value() {
        let document = doc! { "email": "a@x.com", "phone": "0123456789" };
        assert_eq!(first_unique_value(&document, &["email"]), "a@x.com");
        assert_eq!(first_unique_value(&document, &["missing", "phone"]), "0123456789");
        assert_eq!(first_unique_value(&document, &["missing"]), "");
    }

    #[tokio::test]
    async fn test_scope_excludes_deleted_by_default() {
        let service = test_service(None).await;

        assert_eq!(service.scope(false, None), doc! { "deleted_at": Bson::Null });
        assert_eq!(service.scope(true, None), doc! {});
    }

    #[tokio::test]
    async fn test_ownership_filter_pins_regular_users() {
        let service = test_service(Some("created_by")).await;
        let ctx = RequestContext::authenticated("user-1".to_string(), UserRole::User);

        let scope = service.scope(false, Some(&ctx));
        assert_eq!(scope.get_str("created_by").unwrap(), "user-1");
    }

    #[tokio::test]
    async fn test_ownership_filter_skips_admins() {
        let service = test_service(Some("created_by")).await;
        let ctx = RequestContext::authenticated("admin-1".to_string(), UserRole::Admin);

        assert!(service.ownership_filter(Some(&ctx)).is_none());
        assert_eq!(service.scope(false, Some(&ctx)), doc! { "deleted_at": Bson::Null });
    }

    #[tokio::test]
    async fn test_ownership_filter_without_context_or_field() {
        let scoped = test_service(Some("created_by")).await;
        assert!(scoped.ownership_filter(None).is_none());
        assert!(scoped.ownership_filter(Some(&RequestContext::public())).is_none());

        let unscoped = test_service(None).await;
        let ctx = RequestContext::authenticated("user-1".to_string(), UserRole::User);
        assert!(unscoped.ownership_filter(Some(&ctx)).is_none());
    }
}
