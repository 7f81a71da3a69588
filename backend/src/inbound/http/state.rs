//! Shared HTTP adapter state.
//!
//! Handlers receive this state through `actix_web::web::Data` so they only
//! depend on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{KundeCommand, KundeQuery, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub kunden: Arc<dyn KundeQuery>,
    pub kunden_command: Arc<dyn KundeCommand>,
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use kunde::domain::ports::{KundeCommand, KundeQuery, LoginService};
    /// use kunde::inbound::http::state::HttpState;
    ///
    /// fn build(
    ///     query: Arc<dyn KundeQuery>,
    ///     command: Arc<dyn KundeCommand>,
    ///     login: Arc<dyn LoginService>,
    /// ) -> HttpState {
    ///     HttpState::new(query, command, login)
    /// }
    /// ```
    pub fn new(
        kunden: Arc<dyn KundeQuery>,
        kunden_command: Arc<dyn KundeCommand>,
        login: Arc<dyn LoginService>,
    ) -> Self {
        Self {
            kunden,
            kunden_command,
            login,
        }
    }
}
