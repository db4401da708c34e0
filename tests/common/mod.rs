#![allow(dead_code)]

use chirp::config::security::SecurityConfig;
use chirp::migration::Migrator;
use chirp::models::{post, PostModel, UserModel};
use chirp::services::auth::AuthService;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        std::env::set_var(
            "SECRET_KEY",
            "test_secret_key_that_is_at_least_32_chars_long",
        );
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        let config = SecurityConfig::from_env().expect("security config");
        let _ = chirp::utils::claims::init_security_config(config);
    });
}

/// Fresh in-memory database with the full schema applied, through the
/// same connection setup the binary uses. Every call gets its own
/// database: an in-memory SQLite database lives and dies with its
/// connection.
pub async fn setup_db() -> DatabaseConnection {
    init();

    let db = chirp::config::database::get_database()
        .await
        .expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub const TEST_PASSWORD: &str = "password_123";

pub async fn create_user(db: &DatabaseConnection, username: &str) -> UserModel {
    let (user, _) = AuthService::new(db.clone())
        .register(
            username,
            &format!("{username}@example.com"),
            TEST_PASSWORD,
            false,
        )
        .await
        .expect("register user");
    user
}

pub async fn create_user_with_2fa(
    db: &DatabaseConnection,
    username: &str,
) -> (UserModel, String) {
    let (user, secret) = AuthService::new(db.clone())
        .register(
            username,
            &format!("{username}@example.com"),
            TEST_PASSWORD,
            true,
        )
        .await
        .expect("register user");
    (user, secret.expect("totp secret"))
}

/// Insert a post with an explicit timestamp, bypassing the service so
/// tests control the feed ordering precisely.
pub async fn create_post_at(
    db: &DatabaseConnection,
    user_id: i32,
    body: &str,
    created_at: chrono::NaiveDateTime,
) -> PostModel {
    post::ActiveModel {
        user_id: Set(user_id),
        body: Set(body.to_string()),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert post")
}
