//! Builders wiring the domain services to PostgreSQL or in-memory adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;
use uuid::Uuid;

use kunde::domain::ports::{
    KundeRepository, LoginRepository, LoginRepositoryError, PasswordHasher,
};
use kunde::domain::{AuthService, KundeReadService, KundeWriteService, Login, Rolle};
use kunde::inbound::http::state::HttpState;
use kunde::outbound::mail::ConfiguredMailer;
use kunde::outbound::memory::{InMemoryKundeRepository, InMemoryLoginRepository};
use kunde::outbound::persistence::{DieselKundeRepository, DieselLoginRepository};
use kunde::outbound::security::BcryptPasswordHasher;

use super::{AdminSeed, ServerConfig};

/// Roles of the bootstrap admin.
const ADMIN_ROLLEN: [Rolle; 3] = [Rolle::Admin, Rolle::Kunde, Rolle::Actuator];

/// Wire the services over one pair of stores.
fn build_services<K, L>(kunden: Arc<K>, logins: Arc<L>, config: &ServerConfig) -> HttpState
where
    K: KundeRepository + 'static,
    L: LoginRepository + 'static,
{
    let hasher = Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost));
    let mailer = Arc::new(ConfiguredMailer::new(config.mail.clone()));
    HttpState::new(
        Arc::new(KundeReadService::new(kunden.clone())),
        Arc::new(KundeWriteService::new(
            kunden,
            logins.clone(),
            hasher.clone(),
            mailer,
            Arc::new(DefaultClock),
        )),
        Arc::new(AuthService::new(logins, hasher)),
    )
}

/// Store the bootstrap admin unless the user name is already taken.
///
/// The password policy for registrations does not apply here.
async fn seed_admin<L>(
    logins: &L,
    hasher: &BcryptPasswordHasher,
    admin: &AdminSeed,
) -> std::io::Result<()>
where
    L: LoginRepository + ?Sized,
{
    let password_hash = hasher
        .encode(&admin.password)
        .map_err(|err| std::io::Error::other(format!("admin password hashing failed: {err}")))?;
    let login = Login {
        id: Uuid::new_v4(),
        username: admin.username.to_lowercase(),
        password_hash,
        rollen: ADMIN_ROLLEN.to_vec(),
    };
    match logins.save(&login).await {
        Ok(()) => {
            info!(username = %login.username, "admin login seeded");
            Ok(())
        }
        Err(LoginRepositoryError::DuplicateUsername { .. }) => {
            info!(username = %login.username, "admin login already present");
            Ok(())
        }
        Err(err) => Err(std::io::Error::other(format!("admin seeding failed: {err}"))),
    }
}

async fn seed_and_build<K, L>(
    kunden: Arc<K>,
    logins: Arc<L>,
    config: &ServerConfig,
) -> std::io::Result<HttpState>
where
    K: KundeRepository + 'static,
    L: LoginRepository + 'static,
{
    if let Some(admin) = &config.admin {
        let hasher = BcryptPasswordHasher::new(config.bcrypt_cost);
        seed_admin(logins.as_ref(), &hasher, admin).await?;
    }
    Ok(build_services(kunden, logins, config))
}

/// Build the shared HTTP state: PostgreSQL adapters when a pool is
/// configured, in-memory stores otherwise.
pub(super) async fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL persistence");
            seed_and_build(
                Arc::new(DieselKundeRepository::new(pool.clone())),
                Arc::new(DieselLoginRepository::new(pool.clone())),
                config,
            )
            .await?
        }
        None => {
            info!("no database configured, keeping data in memory");
            seed_and_build(
                Arc::new(InMemoryKundeRepository::new()),
                Arc::new(InMemoryLoginRepository::new()),
                config,
            )
            .await?
        }
    };
    Ok(web::Data::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kunde::domain::LoginCredentials;
    use rstest::rstest;

    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(Some(4))
    }

    #[rstest]
    #[tokio::test]
    async fn seeding_is_idempotent() {
        let logins = InMemoryLoginRepository::new();
        let admin = AdminSeed::new("Admin", "p");

        seed_admin(&logins, &hasher(), &admin).await.expect("first seed");
        seed_admin(&logins, &hasher(), &admin).await.expect("second seed");

        let stored = logins
            .find_by_username("admin")
            .await
            .expect("lookup")
            .expect("admin stored");
        assert_eq!(stored.rollen, ADMIN_ROLLEN.to_vec());
        assert!(hasher().matches("p", &stored.password_hash).expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn seeded_admin_can_authenticate() {
        let config = ServerConfig::new(([127, 0, 0, 1], 0).into())
            .with_bcrypt_cost(4)
            .with_admin(AdminSeed::new("admin", "Admin123!"));

        let state = build_http_state(&config).await.expect("state builds");
        let credentials =
            LoginCredentials::try_from_parts("admin", "Admin123!").expect("valid credentials");
        let user = state
            .login
            .authenticate(&credentials)
            .await
            .expect("admin authenticates");
        assert!(user.is_admin());
    }
}
