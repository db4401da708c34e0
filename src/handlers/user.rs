use crate::error::{AppError, AppResult};
use crate::handlers::auth::UserResponse;
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::user::UserService;
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
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 300))]
    pub about_me: Option<String>,
}

/// Public view of a profile: no email.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i32,
    pub username: String,
    pub about_me: Option<String>,
    pub last_seen: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<crate::models::UserModel> for ProfileResponse {
    fn from(user: crate::models::UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            about_me: user.about_me,
            last_seen: user.last_seen,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = ProfileResponse),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_user(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db);
    let user = service.get_by_id(id).await?;

    Ok(ApiResponse::ok(ProfileResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateProfileRequest,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 403, description = "Not the profile owner", body = AppError),
        (status = 409, description = "Username or email already exists", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    if auth_user.user_id != id {
        return Err(AppError::Forbidden);
    }

    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = UserService::new(db);
    let user = service
        .update_profile(
            id,
            payload.username.as_deref(),
            payload.email.as_deref(),
            payload.about_me.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 403, description = "Not the account owner", body = AppError),
    ),
    tag = "users"
)]
pub async fn delete_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    if auth_user.user_id != id {
        return Err(AppError::Forbidden);
    }

    let service = UserService::new(db);
    service.delete(id).await?;

    Ok(ApiResponse::with_message((), "Account deleted.".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/followers",
    params(
        ("id" = i32, Path, description = "User ID"),
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Followers of the user", body = PaginatedResponse<ProfileResponse>),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn list_followers(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    UserService::new(db.clone()).get_by_id(id).await?;

    let page = pagination.page.unwrap_or(1).max(1);
    let per_page = pagination.per_page.unwrap_or(20).clamp(1, 100);

    let service = crate::services::follow::FollowService::new(db);
    let (users, total) = service.list_followers(id, page, per_page).await?;
    let items: Vec<ProfileResponse> = users.into_iter().map(ProfileResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/following",
    params(
        ("id" = i32, Path, description = "User ID"),
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Users this user follows", body = PaginatedResponse<ProfileResponse>),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn list_following(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    UserService::new(db.clone()).get_by_id(id).await?;

    let page = pagination.page.unwrap_or(1).max(1);
    let per_page = pagination.per_page.unwrap_or(20).clamp(1, 100);

    let service = crate::services::follow::FollowService::new(db);
    let (users, total) = service.list_following(id, page, per_page).await?;
    let items: Vec<ProfileResponse> = users.into_iter().map(ProfileResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}
