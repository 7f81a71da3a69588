//! SMTP delivery through `lettre`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, trace};

use crate::domain::Kunde;
use crate::domain::ports::{Mailer, MailerError};

use super::MailConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// [`Mailer`] handing the HTML notification to an SMTP relay.
///
/// The relay is spoken to without TLS; it is expected on the local network.
#[derive(Clone)]
pub struct SmtpMailer {
    config: MailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp.host.as_str())
                .port(config.smtp.port)
                .timeout(Some(SEND_TIMEOUT));
        if let Some((username, password)) = config.smtp.credentials() {
            builder = builder.credentials(Credentials::new(username.to_owned(), password.to_owned()));
        }
        Self {
            transport: builder.build(),
            config,
        }
    }

    /// Build the MIME message announcing `kunde`.
    pub fn message(&self, kunde: &Kunde) -> Result<Message, MailerError> {
        let composed = self.config.compose(kunde);
        trace!(body = %composed.body, "composing mail");
        Message::builder()
            .from(mailbox(&composed.from)?)
            .to(mailbox(&composed.to)?)
            .subject(composed.subject)
            .header(ContentType::TEXT_HTML)
            .body(composed.body)
            .map_err(|err| MailerError::invalid(err.to_string()))
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address
        .parse()
        .map_err(|err| MailerError::invalid(format!("{address}: {err}")))
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, neuer_kunde: &Kunde) -> Result<(), MailerError> {
        let message = self.message(neuer_kunde)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailerError::unavailable(err.to_string()))?;
        debug!(code = %response.code(), "mail sent");
        Ok(())
    }
}
