//! Credential checks backing HTTP Basic authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::kunde_service_support::map_login_repository_error;
use crate::domain::ports::{LoginRepository, LoginService, PasswordHasher};
use crate::domain::{AuthenticatedUser, Error, LoginCredentials};

const INVALID_CREDENTIALS: &str = "Ungueltige Anmeldedaten";

/// [`LoginService`] backed by the login store and a password hasher.
#[derive(Clone)]
pub struct AuthService<L, H> {
    logins: Arc<L>,
    hasher: Arc<H>,
}

impl<L, H> AuthService<L, H> {
    pub fn new(logins: Arc<L>, hasher: Arc<H>) -> Self {
        Self { logins, hasher }
    }
}

#[async_trait]
impl<L, H> LoginService for AuthService<L, H>
where
    L: LoginRepository,
    H: PasswordHasher + 'static,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let username = credentials.username().to_lowercase();
        let Some(login) = self
            .logins
            .find_by_username(&username)
            .await
            .map_err(map_login_repository_error)?
        else {
            debug!(%username, "unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(credentials.password().to_owned());
        let hash = login.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.matches(&password, &hash))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))?
            .map_err(|err| Error::internal(err.to_string()))?;
        if !matches {
            debug!(%username, "password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(AuthenticatedUser::new(login.username, login.rollen))
    }
}
