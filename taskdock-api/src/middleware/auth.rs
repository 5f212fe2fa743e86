//! Access control gate
//!
//! Runs before the handler and short-circuits on failure — the handler body
//! never executes when the gate rejects. Two layers compose per route group:
//!
//! - [`authenticate`]: resolves caller identity from the bearer token and
//!   binds an immutable [`RequestContext`] into request extensions
//! - [`require_admin`]: rejects non-admin contexts with `Forbidden`
//!
//! Public routes carry neither layer. Handlers read the context with
//! `Extension<RequestContext>`.

use axum::extract::{Request, State};
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use taskdock_shared::auth::context::RequestContext;
use taskdock_shared::auth::jwt;
use taskdock_shared::error::AppError;

use crate::app::AppState;
use crate::error::ApiError;

/// Authentication middleware
///
/// Fails with `Unauthorized` when the Authorization header is absent, not a
/// bearer token, or the token does not validate.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(AppError::Unauthorized)?;
    let claims = jwt::validate_token(token, &state.config.jwt)?;

    let ctx = RequestContext::authenticated(claims.user_id, claims.user_role);
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Admin gate; must run after [`authenticate`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = req
        .extensions()
        .get::<RequestContext>()
        .ok_or(AppError::Unauthorized)?;

    if !ctx.is_admin() {
        return Err(AppError::Forbidden.into());
    }
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
