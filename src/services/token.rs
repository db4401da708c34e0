use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

/// A token with less remaining life than this is reissued instead of
/// being handed out again.
const REFRESH_MARGIN_SECONDS: i64 = 60;

const TOKEN_BYTES: usize = 24;

pub struct TokenService {
    db: DatabaseConnection,
}

impl TokenService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Return the user's bearer token, issuing a fresh one only when the
    /// current token is absent or close to expiry. Two calls inside the
    /// validity window return the identical string.
    pub async fn get_token(&self, user_id: i32) -> AppResult<String> {
        self.get_token_with_ttl(user_id, DEFAULT_TOKEN_TTL_SECONDS)
            .await
    }

    pub async fn get_token_with_ttl(&self, user_id: i32, ttl_seconds: i64) -> AppResult<String> {
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        if let (Some(token), Some(expiration)) = (&user.token, user.token_expiration) {
            if expiration > now + Duration::seconds(REFRESH_MARGIN_SECONDS) {
                return Ok(token.clone());
            }
        }

        let token = generate_token()?;
        let expiration = now + Duration::seconds(ttl_seconds);

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.token_expiration = Set(Some(expiration));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        Ok(token)
    }

    /// Move the expiration one second into the past. The token string is
    /// kept, so a revoked token differs from a never-issued one only by
    /// the expiry check.
    pub async fn revoke_token(&self, user_id: i32) -> AppResult<()> {
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.token_expiration = Set(Some(now - Duration::seconds(1)));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        Ok(())
    }

    /// Resolve a presented token to its owner. Absent, expired and
    /// unknown tokens all come back as None, never as an error.
    pub async fn check_token(&self, token: &str) -> AppResult<Option<UserModel>> {
        if token.is_empty() {
            return Ok(None);
        }

        let user = User::find()
            .filter(user::Column::Token.eq(token))
            .one(&self.db)
            .await?;

        let now = chrono::Utc::now().naive_utc();
        Ok(user.filter(|u| matches!(u.token_expiration, Some(exp) if exp > now)))
    }
}

fn generate_token() -> AppResult<String> {
    let mut buf = [0u8; TOKEN_BYTES];
    getrandom::getrandom(&mut buf)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("OS random source unavailable: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}
