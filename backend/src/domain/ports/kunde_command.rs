//! Driving port for customer writes.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, Kunde, KundeId, NewLogin, PatchOperation};

/// Write use-cases for customers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KundeCommand: Send + Sync {
    /// Register a customer together with its login.
    async fn create(&self, kunde: Kunde, login: NewLogin) -> Result<Kunde, Error>;

    /// Replace the mutable scalars of customer `id` when `version` is
    /// current. Returns the stored record with its new version.
    async fn update(&self, kunde: Kunde, id: &KundeId, version: i64) -> Result<Kunde, Error>;

    /// Apply patch operations to customer `id` when `version` is current.
    async fn patch(
        &self,
        id: &KundeId,
        version: i64,
        operations: Vec<PatchOperation>,
        user: &AuthenticatedUser,
    ) -> Result<Kunde, Error>;

    /// Delete customer `id`. Deleting a missing customer succeeds.
    async fn delete_by_id(&self, id: &KundeId) -> Result<(), Error>;
}
