//! In-memory `KundeRepository` used without a database and in HTTP tests.
//!
//! Mirrors the Diesel adapter: searches evaluate the same predicate tree,
//! results are ordered by id, and updates are conditional on the stored
//! version and only touch scalars and interests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::domain::ports::{KundeRepository, KundeRepositoryError};
use crate::domain::{Kunde, KundeId, KundePredicate};

/// Customer store kept in a mutex-guarded ordered map.
#[derive(Debug, Default)]
pub struct InMemoryKundeRepository {
    kunden: Mutex<BTreeMap<KundeId, Kunde>>,
}

impl InMemoryKundeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store; records without an id receive a random one.
    pub fn seeded(kunden: impl IntoIterator<Item = Kunde>) -> Self {
        let kunden = kunden
            .into_iter()
            .map(|mut kunde| {
                let id = *kunde.id.get_or_insert_with(KundeId::random);
                kunde.interessen = Some(kunde.interessen_or_empty().to_vec());
                (id, kunde)
            })
            .collect();
        Self {
            kunden: Mutex::new(kunden),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<KundeId, Kunde>>, KundeRepositoryError> {
        self.kunden
            .lock()
            .map_err(|_| KundeRepositoryError::query("kunde store lock poisoned"))
    }

    fn filtered(
        &self,
        keep: impl Fn(&Kunde) -> bool,
    ) -> Result<Vec<Kunde>, KundeRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|kunde| keep(kunde))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl KundeRepository for InMemoryKundeRepository {
    async fn find_all(&self) -> Result<Vec<Kunde>, KundeRepositoryError> {
        self.filtered(|_| true)
    }

    async fn find_matching(
        &self,
        predicate: &KundePredicate,
    ) -> Result<Vec<Kunde>, KundeRepositoryError> {
        self.filtered(|kunde| predicate.matches(kunde))
    }

    async fn find_by_id(&self, id: &KundeId) -> Result<Option<Kunde>, KundeRepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn find_by_nachname(&self, teil: &str) -> Result<Vec<Kunde>, KundeRepositoryError> {
        let teil = teil.to_lowercase();
        self.filtered(|kunde| kunde.nachname.to_lowercase().contains(&teil))
    }

    async fn find_by_email(&self, prefix: &str) -> Result<Vec<Kunde>, KundeRepositoryError> {
        let prefix = prefix.to_lowercase();
        self.filtered(|kunde| kunde.email.to_lowercase().starts_with(&prefix))
    }

    async fn find_nachnamen_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, KundeRepositoryError> {
        let prefix = prefix.to_lowercase();
        let nachnamen: BTreeSet<String> = self
            .lock()?
            .values()
            .filter(|kunde| kunde.nachname.to_lowercase().starts_with(&prefix))
            .map(|kunde| kunde.nachname.clone())
            .collect();
        Ok(nachnamen.into_iter().collect())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, KundeRepositoryError> {
        Ok(self.lock()?.values().any(|kunde| kunde.email == email))
    }

    async fn insert(&self, record: &Kunde) -> Result<Kunde, KundeRepositoryError> {
        let id = KundeId::random();
        let erzeugt = record.erzeugt.unwrap_or_else(Utc::now);
        let mut saved = record.clone();
        saved.id = Some(id);
        saved.version = 0;
        saved.interessen = Some(record.interessen_or_empty().to_vec());
        saved.erzeugt = Some(erzeugt);
        saved.aktualisiert = Some(record.aktualisiert.unwrap_or(erzeugt));

        let mut kunden = self.lock()?;
        if kunden.values().any(|kunde| kunde.email == record.email) {
            return Err(KundeRepositoryError::duplicate_email(record.email.clone()));
        }
        kunden.insert(id, saved.clone());
        debug!(%id, "kunde inserted");
        Ok(saved)
    }

    async fn update(
        &self,
        record: &Kunde,
        expected_version: u32,
    ) -> Result<Kunde, KundeRepositoryError> {
        let Some(id) = record.id else {
            return Err(KundeRepositoryError::query("cannot update a kunde without id"));
        };
        let mut kunden = self.lock()?;
        if kunden
            .values()
            .any(|kunde| kunde.id != Some(id) && kunde.email == record.email)
        {
            return Err(KundeRepositoryError::duplicate_email(record.email.clone()));
        }
        let Some(stored) = kunden.get_mut(&id) else {
            return Err(KundeRepositoryError::missing(id.to_string()));
        };
        if stored.version != expected_version {
            return Err(KundeRepositoryError::version_mismatch(
                expected_version,
                stored.version,
            ));
        }

        stored.set(record);
        stored.interessen = Some(record.interessen_or_empty().to_vec());
        stored.aktualisiert = Some(record.aktualisiert.unwrap_or_else(Utc::now));
        stored.version += 1;
        debug!(%id, version = stored.version, "kunde updated");
        Ok(stored.clone())
    }

    async fn delete(&self, id: &KundeId) -> Result<bool, KundeRepositoryError> {
        Ok(self.lock()?.remove(id).is_some())
    }
}
