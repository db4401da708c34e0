use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::auth::{AuthService, LoginOutcome};
use crate::services::email::EmailService;
use crate::services::user::UserService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Username (3-50 characters)
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Password (min 8 characters)
    #[validate(length(min = 8))]
    pub password: String,
    /// Enroll a TOTP second factor at registration
    #[serde(default)]
    pub enable_two_factor: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TwoFactorRequest {
    /// Pending token returned by /auth/login
    pub pending_token: String,
    /// Six-digit TOTP code
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserResponse,
    /// TOTP secret, present only when two-factor was enrolled. Shown
    /// exactly once; it cannot be retrieved again.
    pub totp_secret: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// When true, finish login via /auth/login/2fa using pending_token
    pub two_factor_required: bool,
    pub token: Option<String>,
    pub pending_token: Option<String>,
    pub user: Option<UserResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub about_me: Option<String>,
    pub last_seen: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            about_me: user.about_me,
            last_seen: user.last_seen,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Username or email already exists", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = AuthService::new(db);
    let (user, totp_secret) = service
        .register(
            &payload.username,
            &payload.email,
            &payload.password,
            payload.enable_two_factor,
        )
        .await?;

    let response = RegisterResponse {
        user: UserResponse::from(user),
        totp_secret,
    };

    Ok(ApiResponse::with_message(
        response,
        "Registration successful.".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful or two-factor challenge issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let response = match service.login(&payload.username, &payload.password).await? {
        LoginOutcome::Authenticated { user, token } => LoginResponse {
            two_factor_required: false,
            token: Some(token),
            pending_token: None,
            user: Some(UserResponse::from(user)),
        },
        LoginOutcome::TwoFactorRequired { pending_token } => LoginResponse {
            two_factor_required: true,
            token: None,
            pending_token: Some(pending_token),
            user: None,
        },
    };

    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login/2fa",
    request_body = TwoFactorRequest,
    responses(
        (status = 200, description = "Two-factor login completed", body = LoginResponse),
        (status = 401, description = "Invalid pending token or code", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login_two_factor(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<TwoFactorRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let (user, token) = service
        .complete_two_factor(&payload.pending_token, &payload.code)
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        two_factor_required: false,
        token: Some(token),
        pending_token: None,
        user: Some(UserResponse::from(user)),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent if the address is registered"),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = AuthService::new(db);
    service
        .forgot_password(&payload.email, &email_service)
        .await?;

    // Same reply whether or not the address exists.
    Ok(ApiResponse::with_message(
        (),
        "If the email is registered, a reset link has been sent.".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successfully"),
        (status = 401, description = "Invalid or expired reset token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn reset_password(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = AuthService::new(db);
    service
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(ApiResponse::with_message(
        (),
        "Password has been reset. Please log in again.".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn logout(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    service.logout(auth_user.user_id).await?;

    Ok(ApiResponse::with_message((), "Logged out.".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Current user retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db);
    let user = service.get_by_id(auth_user.user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}
