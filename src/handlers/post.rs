use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::PostModel;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::post::PostService;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Post body (1-280 characters)
    #[validate(length(min = 1, max = 280))]
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: i32,
    pub user_id: i32,
    pub body: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<PostModel> for PostResponse {
    fn from(post: PostModel) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            body: post.body,
            created_at: post.created_at,
        }
    }
}

fn page_params(pagination: &PaginationQuery) -> (u64, u64) {
    let page = pagination.page.unwrap_or(1).max(1);
    let per_page = pagination.per_page.unwrap_or(20).clamp(1, 100);
    (page, per_page)
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/posts",
    params(("id" = i32, Path, description = "Author user ID")),
    request_body = CreatePostRequest,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Post created", body = PostResponse),
        (status = 403, description = "Cannot post as another user", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    if auth_user.user_id != id {
        return Err(AppError::Forbidden);
    }

    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = PostService::new(db);
    let post = service.create(id, &payload.body).await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let post = service.get_by_id(id).await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Post deleted; the deleted post is echoed back", body = PostResponse),
        (status = 403, description = "Not the post owner", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let post = service.delete(id, auth_user.user_id).await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "All posts, newest first", body = PaginatedResponse<PostResponse>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = page_params(&pagination);

    let service = PostService::new(db);
    let (posts, total) = service.list(page, per_page).await?;
    let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/posts",
    params(
        ("id" = i32, Path, description = "Author user ID"),
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "One user's posts, newest first", body = PaginatedResponse<PostResponse>),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn list_user_posts(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = page_params(&pagination);

    let service = PostService::new(db);
    let (posts, total) = service.list_by_user(id, page, per_page).await?;
    let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/feed",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Posts by the user and everyone they follow, newest first", body = PaginatedResponse<PostResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_feed(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = page_params(&pagination);

    let service = PostService::new(db);
    let (posts, total) = service
        .followed_posts(auth_user.user_id, page, per_page)
        .await?;
    let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}
