use anyhow::{Context, Result};

/// Hash a password using bcrypt with a random salt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

/// Verify a password against a stored hash. A mismatch is Ok(false), not
/// an error; bcrypt's comparison is constant-time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_matches_last_set_value() {
        let hash = hash_password("cat").unwrap();
        assert!(verify_password("cat", &hash).unwrap());
        assert!(!verify_password("dog", &hash).unwrap());
    }

    #[test]
    fn rehash_overwrites_previous_password() {
        let first = hash_password("old_password").unwrap();
        let second = hash_password("new_password").unwrap();
        assert!(!verify_password("old_password", &second).unwrap());
        assert!(verify_password("new_password", &second).unwrap());
        // The old hash still verifies the old password but is no longer stored
        assert!(verify_password("old_password", &first).unwrap());
    }

    #[test]
    fn salts_are_random() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }
}
