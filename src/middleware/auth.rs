use crate::{error::AppError, services::token::TokenService, services::user::UserService};
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response, Extension};
use sea_orm::DatabaseConnection;

/// Identity extracted from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

/// Bearer token authentication middleware
///
/// Looks up the opaque token from the Authorization header against the
/// users table, rejects missing/unknown/expired tokens with 401, and
/// adds the authenticated identity to request extensions. Also stamps
/// the user's last_seen as a side effect of any authenticated request.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let token_service = TokenService::new(db.clone());
    let user = token_service
        .check_token(&token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user_service = UserService::new(db);
    user_service.touch_last_seen(user.id).await?;

    let auth_user = AuthUser {
        user_id: user.id,
        username: user.username,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
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

use axum::extract::FromRequestParts;

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
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
