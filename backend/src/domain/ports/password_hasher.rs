//! Port for one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHasherError {
        /// Hashing or verification failed inside the algorithm.
        Hash { message: String } =>
            "password hashing failed: {message}",
    }
}

/// Encodes and verifies passwords.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `plain` into a self-describing encoded string.
    fn encode(&self, plain: &str) -> Result<String, PasswordHasherError>;

    /// Whether `plain` matches the stored `hash`.
    fn matches(&self, plain: &str, hash: &str) -> Result<bool, PasswordHasherError>;
}
