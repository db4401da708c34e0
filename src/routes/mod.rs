use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: credential and recovery endpoints, tightest rate limit.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
        .route(
            "/auth/login/2fa",
            routing::post(handlers::auth::login_two_factor),
        )
        .route(
            "/auth/forgot-password",
            routing::post(handlers::auth::forgot_password),
        )
        .route(
            "/auth/reset-password",
            routing::post(handlers::auth::reset_password),
        );

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public read routes: profiles and posts need no token.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/users/{id}", routing::get(handlers::user::get_user))
        .route(
            "/users/{id}/followers",
            routing::get(handlers::user::list_followers),
        )
        .route(
            "/users/{id}/following",
            routing::get(handlers::user::list_following),
        )
        .route(
            "/users/{id}/posts",
            routing::get(handlers::post::list_user_posts),
        )
        .route("/posts", routing::get(handlers::post::list_posts))
        .route("/posts/{id}", routing::get(handlers::post::get_post));

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Protected routes: everything that acts as an identity.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Session
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        // Account (policy: token identity must match the path id)
        .route(
            "/users/{id}",
            routing::put(handlers::user::update_user).delete(handlers::user::delete_user),
        )
        // Posts
        .route(
            "/users/{id}/posts",
            routing::post(handlers::post::create_post),
        )
        .route("/posts/{id}", routing::delete(handlers::post::delete_post))
        .route("/feed", routing::get(handlers::post::get_feed))
        // Follow
        .route(
            "/users/{id}/follow",
            routing::post(handlers::follow::follow_user)
                .delete(handlers::follow::unfollow_user),
        )
        // Likes
        .route(
            "/posts/{id}/like",
            routing::post(handlers::like::like_post).delete(handlers::like::unlike_post),
        )
        .route(
            "/posts/{id}/like/toggle",
            routing::post(handlers::like::toggle_like),
        )
        // Favorites
        .route(
            "/posts/{id}/favorite",
            routing::post(handlers::favorite::favorite_post)
                .delete(handlers::favorite::unfavorite_post),
        )
        .route(
            "/favorites/{post_id}",
            routing::delete(handlers::favorite::remove_favorite),
        )
        .route("/favorites", routing::get(handlers::favorite::list_favorites));

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
