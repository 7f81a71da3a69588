//! Mail adapters for the "new customer" notification.
//!
//! [`SmtpMailer`] delivers the message through an SMTP relay. With SMTP
//! deactivated, [`TracingMailer`] records the composed message as a
//! structured `mail` event instead. [`ConfiguredMailer`] picks one of the
//! two from the [`MailConfig`].

mod smtp;

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{Mailer, MailerError};
use crate::domain::{Kunde, MailMessage};

pub use smtp::SmtpMailer;

const DEFAULT_SMTP_HOST: &str = "localhost";
const DEFAULT_SMTP_PORT: u16 = 25;

/// SMTP relay address and optional credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SmtpConfig {
    /// Credentials when both parts are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_owned(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Sender and recipient addresses, the relay and the kill switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub from: String,
    pub to: String,
    pub deactivated: bool,
    pub smtp: SmtpConfig,
}

impl MailConfig {
    /// Active configuration using the default relay on `localhost:25`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            deactivated: false,
            smtp: SmtpConfig::default(),
        }
    }

    #[must_use]
    pub fn deactivated(mut self, deactivated: bool) -> Self {
        self.deactivated = deactivated;
        self
    }

    #[must_use]
    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = smtp;
        self
    }

    /// Compose the notification for `kunde`.
    pub fn compose(&self, kunde: &Kunde) -> MailMessage {
        MailMessage::neuer_kunde(kunde, &self.from, &self.to)
    }
}

/// [`Mailer`] used while SMTP is deactivated: nothing leaves the process,
/// the composed message is only logged.
#[derive(Debug, Clone)]
pub struct TracingMailer {
    config: MailConfig,
}

impl TracingMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, neuer_kunde: &Kunde) -> Result<(), MailerError> {
        warn!("SMTP ist deaktiviert.");
        let message = self.config.compose(neuer_kunde);
        debug!(
            target: "mail",
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "mail not sent"
        );
        Ok(())
    }
}

/// The mailer selected by [`MailConfig::deactivated`].
#[derive(Debug, Clone)]
pub enum ConfiguredMailer {
    Smtp(SmtpMailer),
    Deactivated(TracingMailer),
}

impl ConfiguredMailer {
    pub fn new(config: MailConfig) -> Self {
        if config.deactivated {
            Self::Deactivated(TracingMailer::new(config))
        } else {
            Self::Smtp(SmtpMailer::new(config))
        }
    }
}

#[async_trait]
impl Mailer for ConfiguredMailer {
    async fn send(&self, neuer_kunde: &Kunde) -> Result<(), MailerError> {
        match self {
            Self::Smtp(mailer) => mailer.send(neuer_kunde).await,
            Self::Deactivated(mailer) => mailer.send(neuer_kunde).await,
        }
    }
}
