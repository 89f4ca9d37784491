use crate::{
    error::AppError,
    models::User,
    utils::{
        cookie::{extract_cookie, SESSION_TOKEN_COOKIE},
        jwt::decode_token,
    },
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Authenticated requester, available on routes behind `auth_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i32,
}

/// Viewer identity on public routes: `None` for anonymous requests or
/// unusable tokens. Feeds and the post detail view are viewer-dependent
/// (authors see their own unpublished posts), so public reads take this
/// instead of rejecting unauthenticated callers.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<i32>);

/// JWT authentication middleware for mutation routes.
///
/// Resolves the token from the Authorization header (HttpOnly cookie as
/// fallback), verifies it, and confirms the account still exists before
/// any ownership check runs.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = token_user_id(&headers).ok_or(AppError::Unauthorized)?;

    // A token issued before account deletion must not authenticate.
    User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

fn token_user_id(headers: &HeaderMap) -> Option<i32> {
    let token = extract_bearer_token(headers)
        .or_else(|| extract_cookie(headers, SESSION_TOKEN_COOKIE))?;
    let claims = decode_token(&token).ok()?;
    claims.sub.parse().ok()
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(token_user_id(&parts.headers)))
    }
}
