use crate::config::security::SecurityConfig;
use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static SECURITY_CONFIG: OnceLock<SecurityConfig> = OnceLock::new();

/// Initialize security config from environment. Must be called once at startup.
pub fn init_security_config(config: SecurityConfig) -> Result<()> {
    SECURITY_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Security config already initialized"))?;
    Ok(())
}

fn get_config() -> &'static SecurityConfig {
    SECURITY_CONFIG
        .get()
        .expect("Security config not initialized — call init_security_config() at startup")
}

const PURPOSE_RESET: &str = "reset";
const PURPOSE_TWO_FACTOR: &str = "2fa";

/// A self-contained, signed claim binding a user id to a purpose for a
/// limited time. Nothing is persisted; verification is signature + expiry.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    purpose: String,
    exp: usize,
    iat: usize,
}

/// Issue a password-reset token for the user.
pub fn issue_reset_token(user_id: i32) -> Result<String> {
    issue(PURPOSE_RESET, user_id, get_config().reset_token_expiry)
}

/// Resolve a password-reset token to a user id. Bad signature, wrong
/// purpose, expiry and malformed input all collapse to None.
pub fn verify_reset_token(token: &str) -> Option<i32> {
    verify(PURPOSE_RESET, token)
}

/// Issue a pending two-factor login challenge for the user. Holding this
/// token is the AWAITING_2FA state; it proves the password check passed.
pub fn issue_two_factor_token(user_id: i32) -> Result<String> {
    issue(PURPOSE_TWO_FACTOR, user_id, get_config().two_factor_expiry)
}

pub fn verify_two_factor_token(token: &str) -> Option<i32> {
    verify(PURPOSE_TWO_FACTOR, token)
}

fn issue(purpose: &str, user_id: i32, expiry_seconds: u64) -> Result<String> {
    let config = get_config();
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        purpose: purpose.to_string(),
        exp: now + expiry_seconds as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode {} token: {}", purpose, e))
}

fn verify(purpose: &str, token: &str) -> Option<i32> {
    let config = get_config();

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_key.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    if data.claims.purpose != purpose {
        return None;
    }

    Some(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn ensure_config() {
        INIT.call_once(|| {
            std::env::set_var(
                "SECRET_KEY",
                "a_very_long_secret_key_that_is_at_least_32_chars",
            );
            let config = SecurityConfig::from_env().unwrap();
            let _ = init_security_config(config);
        });
    }

    #[test]
    fn reset_token_resolves_to_issuer() {
        ensure_config();
        let token = issue_reset_token(42).unwrap();
        assert_eq!(verify_reset_token(&token), Some(42));
    }

    #[test]
    fn purposes_are_not_interchangeable() {
        ensure_config();
        let reset = issue_reset_token(42).unwrap();
        let pending = issue_two_factor_token(42).unwrap();
        assert_eq!(verify_two_factor_token(&reset), None);
        assert_eq!(verify_reset_token(&pending), None);
    }

    #[test]
    fn tampered_token_fails() {
        ensure_config();
        let token = issue_reset_token(42).unwrap();
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert_eq!(verify_reset_token(&tampered), None);
    }

    #[test]
    fn foreign_signing_key_fails() {
        ensure_config();
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: 42,
            purpose: PURPOSE_RESET.to_string(),
            exp: now + 600,
            iat: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"not_so_secret_key...also_invalid"),
        )
        .unwrap();
        assert_eq!(verify_reset_token(&token), None);
    }

    #[test]
    fn expired_token_fails() {
        ensure_config();
        let config = get_config();
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: 42,
            purpose: PURPOSE_RESET.to_string(),
            exp: now - 600,
            iat: now - 1200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret_key.as_bytes()),
        )
        .unwrap();
        assert_eq!(verify_reset_token(&token), None);
    }

    #[test]
    fn malformed_token_fails() {
        ensure_config();
        assert_eq!(verify_reset_token(""), None);
        assert_eq!(verify_reset_token("garbage"), None);
    }
}
