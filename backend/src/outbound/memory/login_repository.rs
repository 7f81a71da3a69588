//! In-memory `LoginRepository`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::Login;
use crate::domain::ports::{LoginRepository, LoginRepositoryError};

/// Logins keyed by their lower-cased user name.
#[derive(Debug, Default)]
pub struct InMemoryLoginRepository {
    logins: Mutex<HashMap<String, Login>>,
}

impl InMemoryLoginRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store; a later login replaces an earlier one with
    /// the same user name.
    pub fn seeded(logins: impl IntoIterator<Item = Login>) -> Self {
        let logins = logins
            .into_iter()
            .map(|login| (login.username.clone(), login))
            .collect();
        Self {
            logins: Mutex::new(logins),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Login>>, LoginRepositoryError> {
        self.logins
            .lock()
            .map_err(|_| LoginRepositoryError::query("login store lock poisoned"))
    }
}

#[async_trait]
impl LoginRepository for InMemoryLoginRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Login>, LoginRepositoryError> {
        Ok(self.lock()?.get(username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, LoginRepositoryError> {
        Ok(self.lock()?.contains_key(username))
    }

    async fn save(&self, login: &Login) -> Result<(), LoginRepositoryError> {
        let mut logins = self.lock()?;
        if logins.contains_key(&login.username) {
            return Err(LoginRepositoryError::duplicate_username(login.username.as_str()));
        }
        logins.insert(login.username.clone(), login.clone());
        Ok(())
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, LoginRepositoryError> {
        Ok(self.lock()?.remove(username).is_some())
    }
}
