//! Customer read service implementing the [`KundeQuery`] driving port.
//!
//! Searches are orchestrated in four tiers: empty criteria list everybody,
//! a lone `nachname` or `email` criterion goes through the dedicated
//! repository lookup, and everything else is composed by the
//! [`PredicateBuilder`]. An empty result is reported as not-found, except
//! for the unfiltered listing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, trace};

use crate::domain::kunde_service_support::{load_authorized, map_kunde_repository_error};
use crate::domain::ports::{KundeQuery, KundeRepository};
use crate::domain::{AuthenticatedUser, Error, Kunde, KundeId, PredicateBuilder, Suchkriterien};

/// Read service over a [`KundeRepository`].
#[derive(Clone)]
pub struct KundeReadService<R> {
    repo: Arc<R>,
}

impl<R> KundeReadService<R> {
    /// Create a new service with the given repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

fn no_match(kriterien: &Suchkriterien, reason: Option<String>) -> Error {
    let criteria: serde_json::Map<String, serde_json::Value> = kriterien
        .iter()
        .map(|(key, values)| (key.to_owned(), json!(values)))
        .collect();
    Error::not_found("Keine Kunden gefunden").with_details(json!({
        "code": "no_match",
        "criteria": criteria,
        "reason": reason,
    }))
}

fn non_empty(kunden: Vec<Kunde>, kriterien: &Suchkriterien) -> Result<Vec<Kunde>, Error> {
    if kunden.is_empty() {
        Err(no_match(kriterien, None))
    } else {
        Ok(kunden)
    }
}

#[async_trait]
impl<R> KundeQuery for KundeReadService<R>
where
    R: KundeRepository,
{
    async fn find_by_id(&self, id: &KundeId, user: &AuthenticatedUser) -> Result<Kunde, Error> {
        debug!(%id, username = user.username(), "find customer by id");
        load_authorized(self.repo.as_ref(), id, user).await
    }

    async fn find(&self, kriterien: &Suchkriterien) -> Result<Vec<Kunde>, Error> {
        debug!(?kriterien, "find customers");
        if kriterien.is_empty() {
            return self
                .repo
                .find_all()
                .await
                .map_err(map_kunde_repository_error);
        }

        if let Some(nachname) = kriterien.sole_value_for("nachname") {
            let kunden = self
                .repo
                .find_by_nachname(nachname)
                .await
                .map_err(map_kunde_repository_error)?;
            trace!(count = kunden.len(), "fast path by nachname");
            return non_empty(kunden, kriterien);
        }

        if let Some(email) = kriterien.sole_value_for("email") {
            let kunden = self
                .repo
                .find_by_email(email)
                .await
                .map_err(map_kunde_repository_error)?;
            trace!(count = kunden.len(), "fast path by email");
            return non_empty(kunden, kriterien);
        }

        let predicate = PredicateBuilder.build(kriterien).map_err(|err| {
            debug!(error = %err, "criteria yield no predicate");
            no_match(kriterien, Some(err.to_string()))
        })?;
        let kunden = self
            .repo
            .find_matching(&predicate)
            .await
            .map_err(map_kunde_repository_error)?;
        trace!(count = kunden.len(), "predicate search");
        non_empty(kunden, kriterien)
    }

    async fn find_nachnamen_by_prefix(&self, prefix: &str) -> Result<Vec<String>, Error> {
        debug!(prefix, "find surnames by prefix");
        let nachnamen = self
            .repo
            .find_nachnamen_by_prefix(prefix)
            .await
            .map_err(map_kunde_repository_error)?;
        if nachnamen.is_empty() {
            return Err(Error::not_found(format!(
                "Keine Nachnamen mit dem Praefix {prefix} gefunden"
            )));
        }
        Ok(nachnamen)
    }
}
