//! Port for customer persistence.
//!
//! The [`KundeRepository`] trait is the only place where versions change:
//! inserts start at version 0 and every successful update increments the
//! stored version by exactly one. Updates are conditional on the expected
//! version so the second of two racing writers fails deterministically.

use async_trait::async_trait;

use crate::domain::{Kunde, KundeId, KundePredicate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by customer repository adapters.
    pub enum KundeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "kunde repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "kunde repository query failed: {message}",
        /// The stored version differs from the expected one.
        VersionMismatch { expected: u32, actual: u32 } =>
            "version mismatch: expected {expected}, found {actual}",
        /// The customer to update does not exist.
        Missing { id: String } =>
            "kunde {id} does not exist",
        /// Another customer already uses this email address.
        DuplicateEmail { email: String } =>
            "email already taken: {email}",
    }
}

/// Port for customer storage and retrieval.
///
/// Every loaded customer carries its address and an interest collection
/// (empty rather than absent when nothing is stored).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KundeRepository: Send + Sync {
    /// All customers.
    async fn find_all(&self) -> Result<Vec<Kunde>, KundeRepositoryError>;

    /// Customers satisfying `predicate`.
    async fn find_matching(
        &self,
        predicate: &KundePredicate,
    ) -> Result<Vec<Kunde>, KundeRepositoryError>;

    async fn find_by_id(&self, id: &KundeId) -> Result<Option<Kunde>, KundeRepositoryError>;

    /// Case-insensitive substring match on the surname, ordered by id.
    async fn find_by_nachname(&self, teil: &str) -> Result<Vec<Kunde>, KundeRepositoryError>;

    /// Case-insensitive prefix match on the email address.
    async fn find_by_email(&self, prefix: &str) -> Result<Vec<Kunde>, KundeRepositoryError>;

    /// Distinct surnames starting with `prefix` (ignoring case), sorted.
    async fn find_nachnamen_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, KundeRepositoryError>;

    /// Whether any customer uses exactly `email`.
    async fn exists_by_email(&self, email: &str) -> Result<bool, KundeRepositoryError>;

    /// Store a new customer with its address and turnover in one
    /// transaction, returning it with id and version 0.
    ///
    /// # Errors
    /// [`KundeRepositoryError::DuplicateEmail`] when the email address is
    /// already stored.
    async fn insert(&self, kunde: &Kunde) -> Result<Kunde, KundeRepositoryError>;

    /// Overwrite the stored scalars and interests when the stored version
    /// equals `expected_version`, returning the record with its new
    /// version.
    ///
    /// # Errors
    /// [`KundeRepositoryError::VersionMismatch`] when another writer got
    /// there first; [`KundeRepositoryError::Missing`] when the row is gone.
    async fn update(
        &self,
        kunde: &Kunde,
        expected_version: u32,
    ) -> Result<Kunde, KundeRepositoryError>;

    /// Delete a customer with its address and turnover. Returns whether a
    /// row existed.
    async fn delete(&self, id: &KundeId) -> Result<bool, KundeRepositoryError>;
}
