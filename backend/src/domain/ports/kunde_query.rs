//! Driving port for customer reads.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, Kunde, KundeId, Suchkriterien};

/// Read use-cases for customers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KundeQuery: Send + Sync {
    /// Load one customer on behalf of `user`.
    ///
    /// Users may always read their own record; anything else needs the
    /// admin role.
    async fn find_by_id(&self, id: &KundeId, user: &AuthenticatedUser) -> Result<Kunde, Error>;

    /// Search customers. Empty criteria list everybody.
    async fn find(&self, kriterien: &Suchkriterien) -> Result<Vec<Kunde>, Error>;

    /// Distinct surnames starting with `prefix`.
    async fn find_nachnamen_by_prefix(&self, prefix: &str) -> Result<Vec<String>, Error>;
}
