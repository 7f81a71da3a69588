//! HTTP server configuration object and helpers.

use std::fmt;
use std::net::SocketAddr;

use kunde::outbound::mail::{MailConfig, SmtpConfig};
use kunde::outbound::persistence::DbPool;
use kunde::settings::{InvalidHost, KundeSettings};

/// Bootstrap admin login.
#[derive(Clone)]
pub struct AdminSeed {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl AdminSeed {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) mail: MailConfig,
    pub(crate) bcrypt_cost: Option<u32>,
    pub(crate) admin: Option<AdminSeed>,
}

impl ServerConfig {
    /// Configuration with in-memory storage and default mail addresses.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            mail: MailConfig::new("theke@acme.com", "sales@acme.com"),
            bcrypt_cost: None,
            admin: None,
        }
    }

    /// Derive the configuration from loaded settings. The pool is attached
    /// separately because connecting is async.
    pub fn from_settings(settings: &KundeSettings) -> Result<Self, InvalidHost> {
        let defaults = SmtpConfig::default();
        let smtp = SmtpConfig {
            host: settings.smtp_host.clone().unwrap_or(defaults.host),
            port: settings.smtp_port.unwrap_or(defaults.port),
            username: settings.smtp_username.clone(),
            password: settings.smtp_password.clone(),
        };
        let mut config = Self::new(settings.bind_addr()?).with_mail(
            MailConfig::new(settings.mail_from(), settings.mail_to())
                .deactivated(settings.smtp_deactivated)
                .with_smtp(smtp),
        );
        if let Some(cost) = settings.bcrypt_cost {
            config = config.with_bcrypt_cost(cost);
        }
        if let Some((username, password)) = settings.admin_credentials() {
            config = config.with_admin(AdminSeed::new(username, password));
        }
        Ok(config)
    }

    /// Store customers and logins in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_mail(mut self, mail: MailConfig) -> Self {
        self.mail = mail;
        self
    }

    /// bcrypt work factor; bcrypt's default when never set.
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_admin(mut self, admin: AdminSeed) -> Self {
        self.admin = Some(admin);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
