//! bcrypt adapter for the password hasher port.

use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Hashes passwords with bcrypt at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Build a hasher; `None` uses [`bcrypt::DEFAULT_COST`].
    pub fn new(cost: Option<u32>) -> Self {
        Self {
            cost: cost.unwrap_or(bcrypt::DEFAULT_COST),
        }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn encode(&self, plain: &str) -> Result<String, PasswordHasherError> {
        bcrypt::hash(plain, self.cost).map_err(|err| PasswordHasherError::hash(err.to_string()))
    }

    fn matches(&self, plain: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        bcrypt::verify(plain, hash).map_err(|err| PasswordHasherError::hash(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // The minimum cost keeps the tests fast.
    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(Some(4))
    }

    #[rstest]
    fn encoded_password_matches_only_the_original() {
        let hasher = hasher();
        let hash = hasher.encode("Pass1234!").expect("hash");

        assert!(hash.starts_with("$2"));
        assert!(hasher.matches("Pass1234!", &hash).expect("verify"));
        assert!(!hasher.matches("pass1234!", &hash).expect("verify"));
    }

    #[rstest]
    fn malformed_hash_is_an_error() {
        let err = hasher()
            .matches("Pass1234!", "not-a-hash")
            .expect_err("malformed hash");
        assert!(matches!(err, PasswordHasherError::Hash { .. }));
    }

    #[rstest]
    fn invalid_cost_is_an_error() {
        let err = BcryptPasswordHasher::new(Some(99))
            .encode("Pass1234!")
            .expect_err("cost out of range");
        assert!(err.to_string().contains("password hashing failed"));
    }
}
