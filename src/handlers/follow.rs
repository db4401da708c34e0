use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::services::follow::FollowService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FollowResponse {
    /// Whether the authenticated user now follows the target
    pub following: bool,
    /// Whether this request changed anything
    pub changed: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/follow",
    params(("id" = i32, Path, description = "User to follow")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Follow edge ensured", body = FollowResponse),
        (status = 400, description = "Cannot follow yourself", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "follow"
)]
pub async fn follow_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FollowService::new(db);
    let changed = service.follow(auth_user.user_id, id).await?;

    Ok(ApiResponse::ok(FollowResponse {
        following: true,
        changed,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/follow",
    params(("id" = i32, Path, description = "User to unfollow")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Follow edge removed (no-op when absent)", body = FollowResponse),
    ),
    tag = "follow"
)]
pub async fn unfollow_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FollowService::new(db);
    let changed = service.unfollow(auth_user.user_id, id).await?;

    Ok(ApiResponse::ok(FollowResponse {
        following: false,
        changed,
    }))
}
