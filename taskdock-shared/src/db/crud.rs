//! Document-store adapter
//!
//! [`Crud`] wraps a single MongoDB collection and translates generic CRUD
//! calls (save, get, update, delete, paginate, count, aggregate) into driver
//! calls. It owns identifier formatting, field projection, regex escaping and
//! boolean-string coercion — and nothing else: business rules live in the
//! service layer on top.
//!
//! Every document leaving this module has its raw `_id` normalized to a plain
//! hex string, so callers never see `ObjectId` values.

use bson::{doc, oid::ObjectId, Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::{Collection, Database};

use crate::error::{AppError, AppResult};

/// Filter keys reserved for pagination control; never forwarded to the store
const RESERVED_PARAMS: [&str; 6] = ["search", "page", "limit", "fields", "sort_by", "order_by"];

/// Sort direction for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses a query-string value; everything that is not `desc` sorts ascending
    pub fn from_param(value: &str) -> Self {
        if value == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    fn as_i32(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Parameters for a paginated listing
///
/// `filter` may still contain the reserved pagination keys (`search`, `page`,
/// `limit`, `fields`, `sort_by`, `order_by`); they are stripped before the
/// filter reaches the store.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: Document,
    pub search: Option<String>,
    pub search_fields: Vec<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub fields: Option<String>,
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

/// One page of listing results plus pagination metadata
#[derive(Debug, Clone, serde::Serialize)]
pub struct Paginated<T> {
    pub total_items: u64,
    pub total_pages: u64,
    pub records_per_page: usize,
    pub results: Vec<T>,
}

/// Thin CRUD wrapper around one document collection
#[derive(Debug, Clone)]
pub struct Crud {
    collection: Collection<Document>,
}

impl Crud {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    /// Inserts one document and returns the generated id as a hex string
    pub async fn save(&self, document: Document) -> AppResult<String> {
        let result = self.collection.insert_one(document).await?;
        inserted_id_to_string(&result.inserted_id)
    }

    /// Bulk insert; returns the inserted ids in input order
    pub async fn save_many(&self, documents: Vec<Document>) -> AppResult<Vec<String>> {
        let total = documents.len();
        let result = self.collection.insert_many(documents).await?;

        let mut ids = Vec::with_capacity(total);
        for index in 0..total {
            let id = result
                .inserted_ids
                .get(&index)
                .ok_or_else(|| AppError::Internal(format!("bulk insert lost document {index}")))?;
            ids.push(inserted_id_to_string(id)?);
        }
        Ok(ids)
    }

    /// Inserts a document unless one already matches the unique fields
    ///
    /// The existence pre-check is a count query on equality of `unique_fields`
    /// (single or composite). Returns `None` without inserting when any match
    /// exists. Check and insert are not atomic; concurrent callers can race
    /// between them (see DESIGN.md).
    pub async fn save_unique(
        &self,
        document: Document,
        unique_fields: &[&str],
    ) -> AppResult<Option<String>> {
        let mut query = Document::new();
        for field in unique_fields {
            if let Some(value) = document.get(*field) {
                query.insert(*field, value.clone());
            }
        }
        if query.is_empty() {
            return Err(AppError::Internal(
                "save_unique called without any unique field values".to_string(),
            ));
        }

        if self.count_documents(query).await? > 0 {
            return Ok(None);
        }
        self.save(document).await.map(Some)
    }

    /// Looks a document up by id, with optional projection and extra filter
    ///
    /// Fails fast with `InvalidId` when `id` is not a well-formed ObjectId.
    pub async fn get_by_id(
        &self,
        id: &str,
        fields_limit: Option<&str>,
        extra_filter: Document,
    ) -> AppResult<Option<Document>> {
        let object_id = parse_object_id(id)?;
        let mut filter = escape_regex_strings(extra_filter);
        filter.insert("_id", object_id);

        let mut options = FindOneOptions::default();
        options.projection = field_projection(fields_limit);

        let result = self
            .collection
            .find_one(filter)
            .with_options(options)
            .await?;
        Ok(result.map(normalize_id))
    }

    /// First document where `field_name` equals `value`
    pub async fn get_by_field(
        &self,
        value: &str,
        field_name: &str,
        fields_limit: Option<&str>,
        extra_filter: Document,
    ) -> AppResult<Option<Document>> {
        let mut filter = extra_filter;
        filter.insert(field_name, value);
        let filter = escape_regex_strings(filter);

        let mut options = FindOneOptions::default();
        options.projection = field_projection(fields_limit);

        let result = self
            .collection
            .find_one(filter)
            .with_options(options)
            .await?;
        Ok(result.map(normalize_id))
    }

    /// All documents where `field_name` equals `value`
    pub async fn get_all_by_field(
        &self,
        value: &str,
        field_name: &str,
        fields_limit: Option<&str>,
        extra_filter: Document,
    ) -> AppResult<Vec<Document>> {
        let mut filter = extra_filter;
        filter.insert(field_name, value);
        let filter = escape_regex_strings(filter);

        let mut options = FindOptions::default();
        options.projection = field_projection(fields_limit);

        let results: Vec<Document> = self
            .collection
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;
        Ok(results.into_iter().map(normalize_id).collect())
    }

    /// Paginated listing with search, sorting and projection
    pub async fn get_all(&self, query: ListQuery) -> AppResult<Paginated<Document>> {
        let filter = build_filter(&query);

        let mut options = FindOptions::default();
        options.projection = field_projection(query.fields.as_deref());
        options.sort = query
            .sort_by
            .as_ref()
            .map(|field| doc! { field: query.order.as_i32() });
        let skip = compute_skip(query.page, query.limit);
        if skip > 0 {
            options.skip = Some(skip);
        }
        options.limit = query.limit;

        let results: Vec<Document> = self
            .collection
            .find(filter.clone())
            .with_options(options)
            .await?
            .try_collect()
            .await?;
        let results: Vec<Document> = results.into_iter().map(normalize_id).collect();

        let total_items = self.count_documents(filter).await?;
        Ok(Paginated {
            total_items,
            total_pages: compute_total_pages(total_items, query.limit),
            records_per_page: results.len(),
            results,
        })
    }

    /// Merges `data` into the stored document via `$set`
    ///
    /// Returns whether any field actually changed. A matched document whose
    /// fields already held the given values reports `false`.
    pub async fn update_by_id(&self, id: &str, data: Document) -> AppResult<bool> {
        let object_id = parse_object_id(id)?;
        let result = self
            .collection
            .update_one(doc! { "_id": object_id }, doc! { "$set": data })
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Permanently removes a document; returns whether one was removed
    pub async fn delete_by_id(&self, id: &str) -> AppResult<bool> {
        let object_id = parse_object_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": object_id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Retracts named fields from a document via `$unset`
    pub async fn delete_fields(&self, id: &str, field_names: &[&str]) -> AppResult<bool> {
        let object_id = parse_object_id(id)?;
        let mut unset = Document::new();
        for field in field_names {
            unset.insert(*field, Bson::Int32(1));
        }
        let result = self
            .collection
            .update_one(doc! { "_id": object_id }, doc! { "$unset": unset })
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn count_documents(&self, filter: Document) -> AppResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }

    /// Multi-stage aggregation passthrough
    pub async fn aggregate(&self, pipeline: Vec<Document>) -> AppResult<Vec<Document>> {
        Ok(self
            .collection
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?)
    }
}

/// Parses a hex string into an ObjectId, failing with `InvalidId`
pub fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidId { id: id.to_string() })
}

/// Builds an inclusion projection from a comma-separated field list
pub fn field_projection(fields_limit: Option<&str>) -> Option<Document> {
    let fields_limit = fields_limit?.trim();
    if fields_limit.is_empty() {
        return None;
    }
    let mut projection = Document::new();
    for field in fields_limit.split(',') {
        let field = field.trim();
        if !field.is_empty() {
            projection.insert(field, Bson::Int32(1));
        }
    }
    Some(projection)
}

/// Escapes regex metacharacters in every string value of a document
///
/// Filter values are later usable as regex operands; escaping keeps matching
/// literal and closes the filter-injection hole. The dot stays unescaped:
/// equality-filtered values (emails, ids) flow through this path too.
pub fn escape_regex_strings(document: Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, escape_bson(value)))
        .collect()
}

fn escape_bson(value: Bson) -> Bson {
    match value {
        Bson::String(s) => Bson::String(escape_special_chars(&s)),
        Bson::Document(d) => Bson::Document(escape_regex_strings(d)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(escape_bson).collect()),
        other => other,
    }
}

/// Backslash-escapes the regex metacharacters `* + ? ^ $ { } ( ) | [ ] \`
pub fn escape_special_chars(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(
            c,
            '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Coerces `"true"`/`"false"` string values into booleans
///
/// Compatibility shim for schemaless stores: query-string filters arrive as
/// strings, but stored booleans only match actual booleans.
pub fn coerce_bool_strings(document: Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, coerce_bson(value)))
        .collect()
}

fn coerce_bson(value: Bson) -> Bson {
    match value {
        Bson::String(s) => match s.as_str() {
            "true" => Bson::Boolean(true),
            "false" => Bson::Boolean(false),
            _ => Bson::String(s),
        },
        Bson::Document(d) => Bson::Document(coerce_bool_strings(d)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(coerce_bson).collect()),
        other => other,
    }
}

/// Normalizes the raw store identifier to a plain hex string
pub fn normalize_id(mut document: Document) -> Document {
    if let Some(Bson::ObjectId(object_id)) = document.get("_id") {
        let id = object_id.to_hex();
        document.insert("_id", id);
    }
    document
}

/// Renders a stored document as plain JSON
///
/// Used when a caller requests a field projection and the result bypasses the
/// typed response schemas. ObjectIds render as hex strings and datetimes as
/// RFC 3339 strings.
pub fn document_to_json(document: &Document) -> serde_json::Value {
    serde_json::Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), bson_to_json(value)))
            .collect(),
    )
}

fn bson_to_json(value: &Bson) -> serde_json::Value {
    match value {
        Bson::Null => serde_json::Value::Null,
        Bson::Boolean(b) => (*b).into(),
        Bson::Int32(i) => (*i).into(),
        Bson::Int64(i) => (*i).into(),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Bson::String(s) => s.clone().into(),
        Bson::Array(items) => serde_json::Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(d) => document_to_json(d),
        Bson::ObjectId(object_id) => object_id.to_hex().into(),
        Bson::DateTime(dt) => dt.to_chrono().to_rfc3339().into(),
        other => serde_json::Value::String(other.to_string()),
    }
}

fn inserted_id_to_string(id: &Bson) -> AppResult<String> {
    id.as_object_id()
        .map(|object_id| object_id.to_hex())
        .ok_or_else(|| AppError::Internal("store returned a non-ObjectId identifier".to_string()))
}

/// Strips reserved keys, escapes string values, coerces boolean strings and
/// expands `search` into a case-insensitive `$or` disjunction
fn build_filter(query: &ListQuery) -> Document {
    let mut filter = Document::new();
    for (key, value) in query.filter.iter() {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        filter.insert(key.clone(), value.clone());
    }
    let mut filter = coerce_bool_strings(escape_regex_strings(filter));

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        if !query.search_fields.is_empty() {
            let escaped = escape_special_chars(search);
            let branches: Vec<Bson> = query
                .search_fields
                .iter()
                .map(|field| {
                    Bson::Document(doc! {
                        field: { "$regex": format!(".*{escaped}.*"), "$options": "i" }
                    })
                })
                .collect();
            filter.insert("$or", Bson::Array(branches));
        }
    }
    filter
}

fn compute_skip(page: Option<u64>, limit: Option<i64>) -> u64 {
    match (page, limit) {
        (Some(page), Some(limit)) if page > 0 && limit > 0 => (page - 1) * limit as u64,
        _ => 0,
    }
}

fn compute_total_pages(total_items: u64, limit: Option<i64>) -> u64 {
    match limit {
        Some(limit) if limit > 0 => total_items.div_ceil(limit as u64),
        _ => 1,
    }
}
