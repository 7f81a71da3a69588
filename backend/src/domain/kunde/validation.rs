//! Bean-style constraint checks for customer payloads.
//!
//! Validation collects every violation instead of stopping at the first one
//! so clients can fix a payload in a single round trip.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidateEmail;

use super::Kunde;

/// Maximum length of `nachname` in characters.
pub const MAX_NACHNAME_LEN: usize = 40;
/// Maximum length of `email` in characters.
pub const MAX_EMAIL_LEN: usize = 40;
/// Maximum length of the homepage URL column.
pub const MAX_HOMEPAGE_LEN: usize = 40;
/// Maximum length of `username` in characters.
pub const MAX_USERNAME_LEN: usize = 20;
/// Smallest allowed category.
pub const MIN_KATEGORIE: i32 = 0;
/// Largest allowed category.
pub const MAX_KATEGORIE: i32 = 9;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static NACHNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^(o'|von|von der|von und zu|van)?[A-ZÄÖÜ][a-zäöüß]+(-[A-ZÄÖÜ][a-zäöüß]+)?$")
        .expect("nachname pattern compiles")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static PLZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("plz pattern compiles"));

/// One failed constraint, addressed by the property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConstraintViolation {
    #[schema(example = "adresse.plz")]
    pub path: String,
    #[schema(example = "muss auf \"^\\d{5}$\" passen")]
    pub message: String,
}

impl ConstraintViolation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_owned(),
            message: message.into(),
        }
    }
}

/// Check every constraint of `kunde`, using `today` for the birthday check.
///
/// Returns the empty list for a valid customer.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use kunde::domain::{Adresse, Kunde, validate_kunde};
///
/// let mut kunde = Kunde::new("Alpha", "alpha@acme.de");
/// kunde.adresse = Some(Adresse { plz: "76133".into(), ort: "Karlsruhe".into() });
/// let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert!(validate_kunde(&kunde, today).is_empty());
/// ```
pub fn validate_kunde(kunde: &Kunde, today: NaiveDate) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    if !NACHNAME_RE.is_match(&kunde.nachname) {
        violations.push(ConstraintViolation::new(
            "nachname",
            "muss ein gueltiger Nachname sein",
        ));
    }
    if kunde.nachname.chars().count() > MAX_NACHNAME_LEN {
        violations.push(ConstraintViolation::new(
            "nachname",
            format!("Groesse muss zwischen 0 und {MAX_NACHNAME_LEN} sein"),
        ));
    }

    if !kunde.email.as_str().validate_email() {
        violations.push(ConstraintViolation::new(
            "email",
            "muss eine korrekt formatierte E-Mail-Adresse sein",
        ));
    }
    if kunde.email.chars().count() > MAX_EMAIL_LEN {
        violations.push(ConstraintViolation::new(
            "email",
            format!("Groesse muss zwischen 0 und {MAX_EMAIL_LEN} sein"),
        ));
    }

    if !(MIN_KATEGORIE..=MAX_KATEGORIE).contains(&kunde.kategorie) {
        violations.push(ConstraintViolation::new(
            "kategorie",
            format!("muss zwischen {MIN_KATEGORIE} und {MAX_KATEGORIE} liegen"),
        ));
    }

    if kunde.geburtsdatum.is_some_and(|datum| datum >= today) {
        violations.push(ConstraintViolation::new(
            "geburtsdatum",
            "muss ein Datum in der Vergangenheit sein",
        ));
    }

    if kunde
        .homepage
        .as_ref()
        .is_some_and(|url| url.as_str().len() > MAX_HOMEPAGE_LEN)
    {
        violations.push(ConstraintViolation::new(
            "homepage",
            format!("Groesse muss zwischen 0 und {MAX_HOMEPAGE_LEN} sein"),
        ));
    }

    if let Some(interessen) = &kunde.interessen {
        let mut seen = HashSet::with_capacity(interessen.len());
        if !interessen.iter().all(|tag| seen.insert(*tag)) {
            violations.push(ConstraintViolation::new(
                "interessen",
                "darf keine doppelten Elemente enthalten",
            ));
        }
    }

    if kunde
        .username
        .as_ref()
        .is_some_and(|name| name.chars().count() > MAX_USERNAME_LEN)
    {
        violations.push(ConstraintViolation::new(
            "username",
            format!("Groesse muss zwischen 0 und {MAX_USERNAME_LEN} sein"),
        ));
    }

    match &kunde.adresse {
        None => violations.push(ConstraintViolation::new("adresse", "darf nicht null sein")),
        Some(adresse) => {
            if !PLZ_RE.is_match(&adresse.plz) {
                violations.push(ConstraintViolation::new(
                    "adresse.plz",
                    "muss auf \"^\\d{5}$\" passen",
                ));
            }
            if adresse.ort.trim().is_empty() {
                violations.push(ConstraintViolation::new("adresse.ort", "darf nicht leer sein"));
            }
        }
    }

    violations
}
