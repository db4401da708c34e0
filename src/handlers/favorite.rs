use crate::error::{AppError, AppResult};
use crate::handlers::post::PostResponse;
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::favorite::FavoriteService;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteResponse {
    /// Whether the post is now in the user's favorites
    pub favorited: bool,
    /// Whether this request changed anything
    pub changed: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/favorite",
    params(("id" = i32, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Favorite ensured", body = FavoriteResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "favorites"
)]
pub async fn favorite_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FavoriteService::new(db);
    let changed = service.favorite(auth_user.user_id, id).await?;

    Ok(ApiResponse::ok(FavoriteResponse {
        favorited: true,
        changed,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}/favorite",
    params(("id" = i32, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Favorite removed", body = FavoriteResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "favorites"
)]
pub async fn unfavorite_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FavoriteService::new(db);
    let changed = service.unfavorite(auth_user.user_id, id).await?;

    Ok(ApiResponse::ok(FavoriteResponse {
        favorited: false,
        changed,
    }))
}

/// Removes a favorite edge by post id alone, without touching the posts
/// table. This is how a client cleans up a favorite whose post has since
/// been deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/favorites/{post_id}",
    params(("post_id" = i32, Path, description = "Post ID the favorite points at")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Favorite edge removed", body = FavoriteResponse),
        (status = 404, description = "No such favorite", body = AppError),
    ),
    tag = "favorites"
)]
pub async fn remove_favorite(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FavoriteService::new(db);
    service.unfavorite_deleted(auth_user.user_id, post_id).await?;

    Ok(ApiResponse::ok(FavoriteResponse {
        favorited: false,
        changed: true,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "The user's favorited posts, most recently favorited first", body = PaginatedResponse<PostResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "favorites"
)]
pub async fn list_favorites(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let page = pagination.page.unwrap_or(1).max(1);
    let per_page = pagination.per_page.unwrap_or(20).clamp(1, 100);

    let service = FavoriteService::new(db);
    let (posts, total) = service.list_for_user(auth_user.user_id, page, per_page).await?;
    let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}
