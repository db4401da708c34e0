use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    /// Validity of a password-reset claim, seconds.
    pub reset_token_expiry: u64,
    /// Validity of a pending two-factor login challenge, seconds.
    pub two_factor_expiry: u64,
}

impl SecurityConfig {
    pub fn from_env() -> Result<Self> {
        let secret_key = env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY environment variable must be set"))?;

        if secret_key.len() < 32 {
            return Err(anyhow::anyhow!("SECRET_KEY must be at least 32 characters"));
        }

        let reset_token_expiry = env::var("RESET_TOKEN_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(600); // 10 minutes

        let two_factor_expiry = env::var("TWO_FACTOR_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300); // 5 minutes

        Ok(Self {
            secret_key,
            reset_token_expiry,
            two_factor_expiry,
        })
    }
}
