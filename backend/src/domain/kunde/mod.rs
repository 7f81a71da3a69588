//! Customer aggregate.
//!
//! A [`Kunde`] owns exactly one [`Adresse`] once persisted and an ordered
//! list of [`Umsatz`] rows. The `version` field is owned by the persistence
//! adapter: it starts at 0 on insert and grows by one on every successful
//! update. Services read it for optimistic concurrency checks but never
//! write it.

mod types;
mod validation;

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub use self::types::{
    FamilienstandType, GeschlechtType, InteresseType, UnknownCodeError, join_interessen,
    split_interessen,
};
pub use self::validation::{
    ConstraintViolation, MAX_EMAIL_LEN, MAX_KATEGORIE, MAX_NACHNAME_LEN, MAX_USERNAME_LEN,
    MIN_KATEGORIE, validate_kunde,
};

/// Stable customer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KundeId(Uuid);

impl KundeId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for KundeId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<KundeId> for Uuid {
    fn from(value: KundeId) -> Self {
        value.0
    }
}

impl fmt::Display for KundeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for KundeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Postal address of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adresse {
    /// Five digit postal code.
    pub plz: String,
    /// City name.
    pub ort: String,
}

/// Three letter ISO 4217 currency code such as `EUR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Waehrung(String);

/// Error returned for currency codes that are not three ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid currency code: {0}")]
pub struct InvalidWaehrung(String);

impl Waehrung {
    /// Validate and upper-case a currency code.
    pub fn new(code: impl AsRef<str>) -> Result<Self, InvalidWaehrung> {
        let code = code.as_ref();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(InvalidWaehrung(code.to_owned()))
        }
    }
}

impl AsRef<str> for Waehrung {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Waehrung> for String {
    fn from(value: Waehrung) -> Self {
        value.0
    }
}

impl TryFrom<String> for Waehrung {
    type Error = InvalidWaehrung;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A single turnover entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Umsatz {
    /// Amount with arbitrary decimal precision.
    pub betrag: Decimal,
    /// Currency of the amount.
    pub waehrung: Waehrung,
}

/// Customer record.
///
/// ## Invariants
/// - `interessen` never contains duplicates once validated.
/// - `adresse` is present for every persisted customer.
/// - `version` changes only inside the persistence adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Kunde {
    pub id: Option<KundeId>,
    pub version: u32,
    pub nachname: String,
    pub email: String,
    pub kategorie: i32,
    pub has_newsletter: bool,
    pub geburtsdatum: Option<NaiveDate>,
    pub homepage: Option<Url>,
    pub geschlecht: Option<GeschlechtType>,
    pub familienstand: Option<FamilienstandType>,
    /// `None` when the caller never supplied the collection.
    pub interessen: Option<Vec<InteresseType>>,
    pub adresse: Option<Adresse>,
    pub umsaetze: Vec<Umsatz>,
    pub username: Option<String>,
    pub erzeugt: Option<DateTime<Utc>>,
    pub aktualisiert: Option<DateTime<Utc>>,
}

impl Kunde {
    /// Start a new unsaved customer with the mandatory scalar fields.
    ///
    /// # Examples
    /// ```
    /// use kunde::domain::Kunde;
    ///
    /// let kunde = Kunde::new("Alpha", "alpha@acme.de");
    /// assert_eq!(kunde.version, 0);
    /// assert!(kunde.id.is_none());
    /// ```
    pub fn new(nachname: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            version: 0,
            nachname: nachname.into(),
            email: email.into(),
            kategorie: 0,
            has_newsletter: false,
            geburtsdatum: None,
            homepage: None,
            geschlecht: None,
            familienstand: None,
            interessen: None,
            adresse: None,
            umsaetze: Vec::new(),
            username: None,
            erzeugt: None,
            aktualisiert: None,
        }
    }

    /// Copy the scalar fields a full replacement may change.
    ///
    /// Address, turnover and interests stay untouched; those only change on
    /// creation or through a patch.
    pub fn set(&mut self, other: &Kunde) {
        self.nachname.clone_from(&other.nachname);
        self.email.clone_from(&other.email);
        self.kategorie = other.kategorie;
        self.has_newsletter = other.has_newsletter;
        self.geburtsdatum = other.geburtsdatum;
        self.homepage.clone_from(&other.homepage);
        self.geschlecht = other.geschlecht;
        self.familienstand = other.familienstand;
    }

    /// Interests as a slice, treating an absent collection as empty.
    pub fn interessen_or_empty(&self) -> &[InteresseType] {
        self.interessen.as_deref().unwrap_or_default()
    }
}
