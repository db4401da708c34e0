use anyhow::Result;
use data_encoding::BASE32_NOPAD;
use std::time::{SystemTime, UNIX_EPOCH};
use totp_lite::{totp_custom, Sha1};

/// RFC 6238 defaults: 30 second time step, 6 digit codes.
pub const STEP_SECONDS: u64 = 30;
pub const DIGITS: u32 = 6;

const SECRET_BYTES: usize = 20;

pub fn now_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Generate a fresh base32 secret. Shown to the user exactly once at
/// enrollment; only the stored copy is used afterwards.
pub fn generate_secret() -> Result<String> {
    let mut buf = [0u8; SECRET_BYTES];
    getrandom::getrandom(&mut buf)
        .map_err(|e| anyhow::anyhow!("OS random source unavailable: {}", e))?;
    Ok(BASE32_NOPAD.encode(&buf))
}

/// Expected code for a secret at a given time, None if the secret is not
/// valid base32.
pub fn code_at(secret: &str, at: u64) -> Option<String> {
    let secret_bytes = BASE32_NOPAD.decode(secret.as_bytes()).ok()?;
    Some(totp_custom::<Sha1>(STEP_SECONDS, DIGITS, &secret_bytes, at))
}

/// Verify a submitted code against the secret at time `at`, tolerating
/// one time step of clock skew in either direction. Returns a bare
/// boolean; the caller learns nothing about why a code was rejected.
pub fn verify_at(secret: &str, code: &str, at: u64) -> bool {
    if code.len() != DIGITS as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let windows = [at.saturating_sub(STEP_SECONDS), at, at + STEP_SECONDS];
    let mut matched = false;
    for t in windows {
        if let Some(expected) = code_at(secret, t) {
            matched |= constant_time_eq(expected.as_bytes(), code.as_bytes());
        }
    }
    matched
}

pub fn verify(secret: &str, code: &str) -> bool {
    verify_at(secret, code, now_epoch_seconds())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
