//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `KUNDE_*` environment variables or a
//! configuration file. Unset values fall back to the defaults below.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MAIL_FROM: &str = "theke@acme.com";
const DEFAULT_MAIL_TO: &str = "sales@acme.com";

/// Error for an unparsable bind host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid host address: {0}")]
pub struct InvalidHost(String);

/// Configuration of the customer service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KUNDE")]
pub struct KundeSettings {
    /// Address to bind, `0.0.0.0` when unset.
    pub host: Option<String>,
    /// Port to bind, 8080 when unset.
    pub port: Option<u16>,
    /// PostgreSQL URL; without it the service keeps its data in memory.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub mail_from: Option<String>,
    pub mail_to: Option<String>,
    /// Log instead of announcing new customers.
    #[ortho_config(default = false)]
    pub smtp_deactivated: bool,
    /// SMTP relay, `localhost:25` when unset.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// bcrypt work factor, bcrypt's default when unset.
    pub bcrypt_cost: Option<u32>,
    /// Bootstrap admin seeded at startup.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl KundeSettings {
    /// Socket address assembled from host and port.
    pub fn bind_addr(&self) -> Result<SocketAddr, InvalidHost> {
        let ip = match self.host.as_deref() {
            Some(host) => host
                .parse::<IpAddr>()
                .map_err(|_| InvalidHost(host.to_owned()))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }

    pub fn mail_to(&self) -> &str {
        self.mail_to.as_deref().unwrap_or(DEFAULT_MAIL_TO)
    }

    /// Admin credentials when both parts are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (self.admin_username.as_deref(), self.admin_password.as_deref()) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

impl fmt::Debug for KundeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KundeSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .field("db_max_connections", &self.db_max_connections)
            .field("mail_from", &self.mail_from)
            .field("mail_to", &self.mail_to)
            .field("smtp_deactivated", &self.smtp_deactivated)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("admin_username", &self.admin_username)
            .finish_non_exhaustive()
    }
}
