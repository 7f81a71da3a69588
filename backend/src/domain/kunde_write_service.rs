//! Customer write service implementing the [`KundeCommand`] driving port.
//!
//! Every mutation validates first, then checks uniqueness, then persists.
//! Updates pass the version guard twice: once against the loaded record,
//! and once more inside the repository through the conditional update, so
//! a concurrent writer that commits in between still loses.
//!
//! A registration stores the login before the customer. When the customer
//! insert fails the login is removed again, so a rejected registration
//! leaves neither record behind.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::kunde_service_support::{
    email_exists, load_authorized, map_kunde_repository_error, map_login_repository_error,
    not_found, username_exists,
};
use crate::domain::ports::{
    KundeCommand, KundeRepository, LoginRepository, Mailer, PasswordHasher,
};
use crate::domain::{
    AuthenticatedUser, Error, Kunde, KundeId, KundePatcher, Login, NewLogin, PatchOperation,
    ensure_current, is_strong_password, validate_kunde,
};

/// Write service over the customer and login stores.
#[derive(Clone)]
pub struct KundeWriteService<K, L, H, M> {
    kunde_repo: Arc<K>,
    login_repo: Arc<L>,
    hasher: Arc<H>,
    mailer: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<K, L, H, M> KundeWriteService<K, L, H, M> {
    /// Create a new service from its collaborators.
    pub fn new(
        kunde_repo: Arc<K>,
        login_repo: Arc<L>,
        hasher: Arc<H>,
        mailer: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            kunde_repo,
            login_repo,
            hasher,
            mailer,
            clock,
        }
    }
}

/// Which fields an update copies onto the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateScope {
    /// Scalars only, as for a full replacement.
    Scalars,
    /// Scalars plus the interest collection, as for a patch.
    ScalarsAndInteressen,
}

impl<K, L, H, M> KundeWriteService<K, L, H, M>
where
    K: KundeRepository,
    L: LoginRepository,
    H: PasswordHasher + 'static,
    M: Mailer,
{
    fn ensure_valid(&self, kunde: &Kunde) -> Result<(), Error> {
        let today = self.clock.utc().date_naive();
        let violations = validate_kunde(kunde, today);
        if violations.is_empty() {
            return Ok(());
        }
        debug!(?violations, "rejecting invalid customer");
        Err(Error::unprocessable_entity("Constraints sind verletzt").with_details(json!({
            "code": "constraint_violations",
            "violations": violations,
        })))
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), Error> {
        let taken = self
            .kunde_repo
            .exists_by_email(email)
            .await
            .map_err(map_kunde_repository_error)?;
        if taken {
            return Err(email_exists(email));
        }
        Ok(())
    }

    /// Store a login for `new_login`, returning the normalised user name.
    async fn register_login(&self, new_login: &NewLogin) -> Result<String, Error> {
        if !is_strong_password(new_login.password()) {
            return Err(Error::unprocessable_entity("Ungueltiges Passwort")
                .with_details(json!({ "code": "password_invalid" })));
        }

        let username = new_login.username().to_lowercase();
        let taken = self
            .login_repo
            .exists_by_username(&username)
            .await
            .map_err(map_login_repository_error)?;
        if taken {
            return Err(username_exists(new_login.username()));
        }

        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(new_login.password().to_owned());
        let password_hash = tokio::task::spawn_blocking(move || hasher.encode(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(err.to_string()))?;

        let login = Login {
            id: Uuid::new_v4(),
            username: username.clone(),
            password_hash,
            rollen: new_login.rollen().to_vec(),
        };
        self.login_repo
            .save(&login)
            .await
            .map_err(map_login_repository_error)?;
        debug!(username = %login.username, rollen = ?login.rollen, "login registered");
        Ok(username)
    }

    /// Remove the login registered for a customer whose insert failed.
    async fn discard_login(&self, username: &str) {
        match self.login_repo.delete_by_username(username).await {
            Ok(_) => debug!(username, "login discarded after failed insert"),
            Err(err) => error!(username, error = %err, "orphaned login could not be removed"),
        }
    }

    async fn apply_update(
        &self,
        changes: &Kunde,
        id: &KundeId,
        version: i64,
        scope: UpdateScope,
    ) -> Result<Kunde, Error> {
        let mut stored = self
            .kunde_repo
            .find_by_id(id)
            .await
            .map_err(map_kunde_repository_error)?
            .ok_or_else(|| not_found(id))?;
        ensure_current(version, stored.version)?;
        let expected_version = stored.version;

        let email_changed = stored.email != changes.email;
        stored.set(changes);
        if scope == UpdateScope::ScalarsAndInteressen {
            stored.interessen.clone_from(&changes.interessen);
        }
        self.ensure_valid(&stored)?;
        if email_changed {
            self.ensure_email_free(&stored.email).await?;
        }

        stored.aktualisiert = Some(self.clock.utc());
        let updated = self
            .kunde_repo
            .update(&stored, expected_version)
            .await
            .map_err(map_kunde_repository_error)?;
        debug!(%id, version = updated.version, "customer updated");
        Ok(updated)
    }
}

#[async_trait]
impl<K, L, H, M> KundeCommand for KundeWriteService<K, L, H, M>
where
    K: KundeRepository,
    L: LoginRepository,
    H: PasswordHasher + 'static,
    M: Mailer,
{
    async fn create(&self, mut kunde: Kunde, login: NewLogin) -> Result<Kunde, Error> {
        debug!(nachname = %kunde.nachname, username = login.username(), "create customer");
        kunde.username = Some(login.username().to_owned());
        self.ensure_valid(&kunde)?;
        self.ensure_email_free(&kunde.email).await?;

        let username = self.register_login(&login).await?;
        let now = self.clock.utc();
        kunde.id = None;
        kunde.version = 0;
        kunde.username = Some(username.clone());
        kunde.erzeugt = Some(now);
        kunde.aktualisiert = Some(now);

        let saved = match self.kunde_repo.insert(&kunde).await {
            Ok(saved) => saved,
            Err(err) => {
                self.discard_login(&username).await;
                return Err(map_kunde_repository_error(err));
            }
        };

        if let Err(err) = self.mailer.send(&saved).await {
            warn!(error = %err, "Email nicht gesendet: Ist der Mailserver erreichbar?");
        }
        debug!(id = ?saved.id, "customer created");
        Ok(saved)
    }

    async fn update(&self, kunde: Kunde, id: &KundeId, version: i64) -> Result<Kunde, Error> {
        debug!(%id, version, "update customer");
        self.apply_update(&kunde, id, version, UpdateScope::Scalars)
            .await
    }

    async fn patch(
        &self,
        id: &KundeId,
        version: i64,
        operations: Vec<PatchOperation>,
        user: &AuthenticatedUser,
    ) -> Result<Kunde, Error> {
        debug!(%id, version, ?operations, username = user.username(), "patch customer");
        let kunde = load_authorized(self.kunde_repo.as_ref(), id, user).await?;
        let patched = KundePatcher.apply(&kunde, &operations)?;
        self.apply_update(&patched, id, version, UpdateScope::ScalarsAndInteressen)
            .await
    }

    async fn delete_by_id(&self, id: &KundeId) -> Result<(), Error> {
        let existed = self
            .kunde_repo
            .delete(id)
            .await
            .map_err(map_kunde_repository_error)?;
        debug!(%id, existed, "delete customer");
        Ok(())
    }
}

#[cfg(test)]
#[path = "kunde_write_service_tests.rs"]
mod tests;
