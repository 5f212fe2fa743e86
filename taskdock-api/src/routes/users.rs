//! User endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/users/register` — create an account, returns a bearer token (public)
//! - `POST /v1/users/login` — verify credentials, returns a bearer token (public)
//! - `GET /v1/users/me` / `PUT /v1/users/me` — self service (authenticated)
//! - `GET /v1/users` — paginated listing, searchable over fullname/email (admin)
//! - `GET/PUT/DELETE /v1/users/:id` — admin user management; DELETE is a soft delete

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use taskdock_shared::auth::context::RequestContext;
use taskdock_shared::auth::jwt;
use taskdock_shared::db::crud::document_to_json;
use taskdock_shared::error::AppError;
use taskdock_shared::models::user::{User, UserRole};
use taskdock_shared::service::users::{RegisterData, UserEdit};

use crate::app::AppState;
use crate::error::ApiResult;
use crate::routes::{FieldsParam, ListResponse, PaginationParams};

/// Fields searched by the listing's `search` parameter
const SEARCH_FIELDS: [&str; 2] = ["fullname", "email"];

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub fullname: String,

    #[validate(email)]
    pub email: String,

    pub phone: Option<String>,

    /// Checked against the configured minimum length by the service
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    pub password: String,
}

/// Profile edit request (self service and admin)
#[derive(Debug, Deserialize)]
pub struct EditUserRequest {
    pub fullname: Option<String>,
    pub phone: Option<String>,
}

/// User representation returned by every endpoint
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub fullname: String,
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "type")]
    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            fullname: user.fullname,
            email: user.email,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at.to_chrono(),
            created_by: user.created_by,
        }
    }
}

/// Registration/login response: the user plus a bearer token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,

    pub access_token: String,
    pub token_type: String,
}

impl LoginResponse {
    fn new(user: User, access_token: String) -> Self {
        Self {
            user: user.into(),
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Registers a new account
///
/// # Errors
///
/// - `400`: invalid email/phone or password below the configured minimum
/// - `409`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    req.validate().map_err(|_| AppError::InvalidEmail {
        email: req.email.clone(),
    })?;

    let user = state
        .users
        .register(RegisterData {
            fullname: req.fullname,
            email: req.email,
            phone: req.phone,
            password: req.password,
        })
        .await?;

    let token = jwt::issue_token(user.id_str(), user.role, &state.config.jwt)?;
    Ok((StatusCode::CREATED, Json(LoginResponse::new(user, token))))
}

/// Verifies credentials and issues a bearer token
///
/// Unknown email and wrong password produce the same `401`.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    req.validate().map_err(|_| AppError::InvalidEmail {
        email: req.email.clone(),
    })?;

    let user = state.users.login(&req.email, &req.password).await?;

    let token = jwt::issue_token(user.id_str(), user.role, &state.config.jwt)?;
    Ok((StatusCode::CREATED, Json(LoginResponse::new(user, token))))
}

/// Returns the caller's own account
pub async fn get_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<FieldsParam>,
) -> ApiResult<Response> {
    let id = ctx.user_id.clone().ok_or(AppError::Unauthorized)?;
    user_detail(&state, &id, params.fields.as_deref(), &ctx).await
}

/// Edits the caller's own account
pub async fn edit_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(req): Json<EditUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let id = ctx.user_id.clone().ok_or(AppError::Unauthorized)?;
    let user = state
        .users
        .edit(
            &id,
            UserEdit {
                fullname: req.fullname,
                phone: req.phone,
            },
            &ctx,
        )
        .await?;
    Ok(Json(user.into()))
}

/// Paginated user listing (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<PaginationParams>,
    Query(raw_params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let projected = params.fields.is_some();
    let query = params.into_query(raw_params, &SEARCH_FIELDS);

    if projected {
        let page = state.users.base().list_raw(query, false, Some(&ctx)).await?;
        let results: Vec<serde_json::Value> = page.results.iter().map(document_to_json).collect();
        return Ok(Json(ListResponse {
            total_items: page.total_items,
            total_pages: page.total_pages,
            records_per_page: page.records_per_page,
            results,
        })
        .into_response());
    }

    let page = state.users.base().list(query, false, Some(&ctx)).await?;
    let results: Vec<UserResponse> = page.results.into_iter().map(Into::into).collect();
    Ok(Json(ListResponse {
        total_items: page.total_items,
        total_pages: page.total_pages,
        records_per_page: page.records_per_page,
        results,
    })
    .into_response())
}

/// Returns one user by id (admin only)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(params): Query<FieldsParam>,
) -> ApiResult<Response> {
    user_detail(&state, &id, params.fields.as_deref(), &ctx).await
}

/// Edits one user by id (admin only)
pub async fn edit_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(req): Json<EditUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users
        .edit(
            &id,
            UserEdit {
                fullname: req.fullname,
                phone: req.phone,
            },
            &ctx,
        )
        .await?;
    Ok(Json(user.into()))
}

/// Soft-deletes one user by id (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.users.base().soft_delete_by_id(&id, Some(&ctx)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Shared detail path: typed response, or raw projected JSON when `fields`
/// was requested
async fn user_detail(
    state: &AppState,
    id: &str,
    fields: Option<&str>,
    ctx: &RequestContext,
) -> ApiResult<Response> {
    if let Some(fields) = fields {
        let document = state
            .users
            .base()
            .find_raw_by_id(id, Some(fields), false, Some(ctx))
            .await?
            .ok_or_else(|| AppError::not_found("users", id))?;
        return Ok(Json(document_to_json(&document)).into_response());
    }

    let user = state.users.base().get_by_id(id, false, Some(ctx)).await?;
    Ok(Json(UserResponse::from(user)).into_response())
}
