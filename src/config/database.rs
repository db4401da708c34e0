use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::time::Duration;

/// Connect using DATABASE_URL. Postgres in production; SQLite (including
/// `sqlite::memory:`) is supported for local runs and the test suite.
pub async fn get_database() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| DbErr::Custom("DATABASE_URL must be set".to_string()))?;

    Database::connect(connect_options(&database_url)).await
}

/// An in-memory SQLite database lives and dies with its connection, so
/// SQLite URLs get a single-connection pool and skip the tuning knobs.
fn connect_options(database_url: &str) -> ConnectOptions {
    let mut opt = ConnectOptions::new(database_url.to_string());

    if database_url.starts_with("sqlite") {
        opt.max_connections(1).sqlx_logging(false);
        return opt;
    }

    let max_connections = env_u32("DB_MAX_CONNECTIONS", 10);
    let min_connections = env_u32("DB_MIN_CONNECTIONS", 2);

    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);
    opt
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_get_a_single_connection() {
        let opt = connect_options("sqlite::memory:");
        assert_eq!(opt.get_max_connections(), Some(1));
        assert!(!opt.get_sqlx_logging());
    }

    #[test]
    fn postgres_urls_get_a_pool() {
        let opt = connect_options("postgres://localhost/chirp");
        assert_eq!(opt.get_max_connections(), Some(10));
        assert!(opt.get_sqlx_logging());
    }
}
