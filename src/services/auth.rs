use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    services::{email::EmailService, token::TokenService, user::UserService},
    utils::{claims, totp, hash_password, verify_password},
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    SqlErr,
};
use sea_orm::ActiveModelTrait;

/// Result of a password check: either a full session, or a pending
/// two-factor challenge the client must answer before any token exists.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated { user: UserModel, token: String },
    TwoFactorRequired { pending_token: String },
}

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new user. When `enable_two_factor` is set, a TOTP
    /// secret is enrolled and returned here exactly once; it is never
    /// shown again.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        enable_two_factor: bool,
    ) -> AppResult<(UserModel, Option<String>)> {
        if self.user_exists(username, email).await? {
            return Err(AppError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let totp_secret = if enable_two_factor {
            Some(totp::generate_secret()?)
        } else {
            None
        };

        let now = chrono::Utc::now().naive_utc();
        let new_user = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            totp_secret: Set(totp_secret.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        // A concurrent registration can slip past the existence check;
        // the unique constraints have the final word.
        let user = new_user.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Username or email already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok((user, totp_secret))
    }

    /// Verify username + password. Unknown username and wrong password
    /// are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let user = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if user.totp_secret.is_some() {
            let pending_token = claims::issue_two_factor_token(user.id)?;
            return Ok(LoginOutcome::TwoFactorRequired { pending_token });
        }

        let token = TokenService::new(self.db.clone()).get_token(user.id).await?;
        Ok(LoginOutcome::Authenticated { user, token })
    }

    /// Answer a pending two-factor challenge. An invalid code fails the
    /// call but leaves the pending token usable, so the client stays in
    /// the awaiting-2FA state and can retry.
    pub async fn complete_two_factor(
        &self,
        pending_token: &str,
        code: &str,
    ) -> AppResult<(UserModel, String)> {
        let user_id = claims::verify_two_factor_token(pending_token).ok_or(AppError::Unauthorized)?;

        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let secret = user.totp_secret.as_deref().ok_or(AppError::Unauthorized)?;
        if !totp::verify(secret, code) {
            return Err(AppError::Unauthorized);
        }

        let token = TokenService::new(self.db.clone()).get_token(user.id).await?;
        Ok((user, token))
    }

    pub async fn logout(&self, user_id: i32) -> AppResult<()> {
        TokenService::new(self.db.clone()).revoke_token(user_id).await
    }

    /// Request a password reset. Silently succeeds when the email is
    /// unknown so the endpoint cannot be used for account enumeration.
    pub async fn forgot_password(&self, email: &str, email_service: &EmailService) -> AppResult<()> {
        let user = match User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
        {
            Some(u) => u,
            None => return Ok(()),
        };

        let token = claims::issue_reset_token(user.id)?;
        if let Err(e) = email_service.send_password_reset_email(&user.email, &token).await {
            tracing::warn!("Failed to send password reset email: {e}");
        }

        Ok(())
    }

    /// Apply a password reset. The claim is self-contained; no reset
    /// state is looked up or cleared in the database. Any live bearer
    /// token is revoked along the way.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<UserModel> {
        let user_id = claims::verify_reset_token(token).ok_or(AppError::Unauthorized)?;

        let user = UserService::new(self.db.clone())
            .set_password(user_id, new_password)
            .await
            .map_err(|e| match e {
                AppError::NotFound => AppError::Unauthorized,
                other => other,
            })?;

        TokenService::new(self.db.clone()).revoke_token(user.id).await?;
        Ok(user)
    }

    async fn user_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
