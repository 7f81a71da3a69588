//! Port for stored logins.

use async_trait::async_trait;

use crate::domain::Login;

use super::define_port_error;

define_port_error! {
    /// Errors raised by login repository adapters.
    pub enum LoginRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "login repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "login repository query failed: {message}",
        /// A login with this user name already exists.
        DuplicateUsername { username: String } =>
            "username already taken: {username}",
    }
}

/// Credential store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginRepository: Send + Sync {
    async fn find_by_username(&self, username: &str)
    -> Result<Option<Login>, LoginRepositoryError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, LoginRepositoryError>;

    async fn save(&self, login: &Login) -> Result<(), LoginRepositoryError>;

    /// Remove the login; returns whether one existed.
    async fn delete_by_username(&self, username: &str) -> Result<bool, LoginRepositoryError>;
}
