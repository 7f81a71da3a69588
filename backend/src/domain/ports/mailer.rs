//! Port for the "new customer" notification.

use async_trait::async_trait;

use crate::domain::Kunde;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The mail server could not be reached or refused the message.
        Unavailable { message: String } =>
            "mail server unavailable: {message}",
        /// The configured addresses do not form a valid message.
        Invalid { message: String } =>
            "mail could not be composed: {message}",
    }
}

/// Notifies sales about a newly registered customer.
///
/// Callers treat delivery as best effort: a failure is logged, never
/// surfaced to the client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, neuer_kunde: &Kunde) -> Result<(), MailerError>;
}
