//! Notification mail sent to sales when a customer registers.

use crate::domain::Kunde;

/// A composed HTML mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Compose the "new customer" notification.
    ///
    /// # Examples
    /// ```
    /// use kunde::domain::{Kunde, MailMessage};
    ///
    /// let kunde = Kunde::new("Alpha", "alpha@acme.de");
    /// let mail = MailMessage::neuer_kunde(&kunde, "theke@acme.com", "sales@acme.com");
    /// assert_eq!(mail.body, "<strong>Neuer Kunde:</strong> <em>Alpha</em>");
    /// ```
    pub fn neuer_kunde(kunde: &Kunde, from: &str, to: &str) -> Self {
        let id = kunde
            .id
            .map_or_else(|| "ohne ID".to_owned(), |id| id.to_string());
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            subject: format!("Neuer Kunde {id}"),
            body: format!("<strong>Neuer Kunde:</strong> <em>{}</em>", kunde.nachname),
        }
    }
}
