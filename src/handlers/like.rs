use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::services::like::LikeService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeResponse {
    /// Whether the authenticated user now likes the post
    pub liked: bool,
    /// Total likes on the post after this request
    pub like_count: u64,
}

async fn like_state(service: &LikeService, liked: bool, post_id: i32) -> AppResult<LikeResponse> {
    Ok(LikeResponse {
        liked,
        like_count: service.count_for_post(post_id).await?,
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/like",
    params(("id" = i32, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Like ensured", body = LikeResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "likes"
)]
pub async fn like_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = LikeService::new(db);
    service.like(auth_user.user_id, id).await?;

    Ok(ApiResponse::ok(like_state(&service, true, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}/like",
    params(("id" = i32, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Like removed (no-op when absent)", body = LikeResponse),
    ),
    tag = "likes"
)]
pub async fn unlike_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = LikeService::new(db);
    service.unlike(auth_user.user_id, id).await?;

    Ok(ApiResponse::ok(like_state(&service, false, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/like/toggle",
    params(("id" = i32, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Like flipped; response reports the resulting state", body = LikeResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "likes"
)]
pub async fn toggle_like(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = LikeService::new(db);
    let liked = service.toggle(auth_user.user_id, id).await?;

    Ok(ApiResponse::ok(like_state(&service, liked, id).await?))
}
