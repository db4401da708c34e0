use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use chirp::{config, migration, routes, services, utils};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        chirp::handlers::auth::register,
        chirp::handlers::auth::login,
        chirp::handlers::auth::login_two_factor,
        chirp::handlers::auth::forgot_password,
        chirp::handlers::auth::reset_password,
        chirp::handlers::auth::logout,
        chirp::handlers::auth::get_current_user,
        // User routes
        chirp::handlers::user::get_user,
        chirp::handlers::user::update_user,
        chirp::handlers::user::delete_user,
        chirp::handlers::user::list_followers,
        chirp::handlers::user::list_following,
        // Post routes
        chirp::handlers::post::create_post,
        chirp::handlers::post::get_post,
        chirp::handlers::post::delete_post,
        chirp::handlers::post::list_posts,
        chirp::handlers::post::list_user_posts,
        chirp::handlers::post::get_feed,
        // Follow routes
        chirp::handlers::follow::follow_user,
        chirp::handlers::follow::unfollow_user,
        // Like routes
        chirp::handlers::like::like_post,
        chirp::handlers::like::unlike_post,
        chirp::handlers::like::toggle_like,
        // Favorite routes
        chirp::handlers::favorite::favorite_post,
        chirp::handlers::favorite::unfavorite_post,
        chirp::handlers::favorite::remove_favorite,
        chirp::handlers::favorite::list_favorites,
    ),
    components(
        schemas(
            chirp::response::ApiResponse<serde_json::Value>,
            chirp::response::PaginatedResponse<serde_json::Value>,
            chirp::response::PaginationQuery,
            chirp::error::AppError,
            // Auth
            chirp::handlers::auth::RegisterRequest,
            chirp::handlers::auth::LoginRequest,
            chirp::handlers::auth::TwoFactorRequest,
            chirp::handlers::auth::ForgotPasswordRequest,
            chirp::handlers::auth::ResetPasswordRequest,
            chirp::handlers::auth::RegisterResponse,
            chirp::handlers::auth::LoginResponse,
            chirp::handlers::auth::UserResponse,
            // User
            chirp::handlers::user::UpdateProfileRequest,
            chirp::handlers::user::ProfileResponse,
            // Post
            chirp::handlers::post::CreatePostRequest,
            chirp::handlers::post::PostResponse,
            // Follow
            chirp::handlers::follow::FollowResponse,
            // Like
            chirp::handlers::like::LikeResponse,
            // Favorite
            chirp::handlers::favorite::FavoriteResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication operations"),
        (name = "users", description = "User profile operations"),
        (name = "posts", description = "Post and feed operations"),
        (name = "follow", description = "Follow graph operations"),
        (name = "likes", description = "Like operations"),
        (name = "favorites", description = "Favorite operations"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirp=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let security_config = validate_config()?;
    utils::claims::init_security_config(security_config)?;

    tracing::info!("Starting Chirp API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let email_service = services::email::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, emails will be skipped");
    }

    let app = create_app()
        .layer(Extension(db))
        .layer(Extension(email_service));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<config::security::SecurityConfig> {
    let security_config = config::security::SecurityConfig::from_env()?;

    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    Ok(security_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Chirp API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
