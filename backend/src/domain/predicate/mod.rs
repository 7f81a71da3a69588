//! Search predicate composition.
//!
//! [`PredicateBuilder`] turns [`Suchkriterien`] into one [`KundePredicate`]
//! or a [`PredicateError`] explaining why the criteria cannot be satisfied.
//! The predicate is a small expression tree: persistence adapters translate
//! it into their query language, and [`KundePredicate::matches`] evaluates
//! it in memory with the same semantics.

use std::num::ParseIntError;

use tracing::{debug, trace};

use crate::domain::{
    FamilienstandType, GeschlechtType, InteresseType, Kunde, Suchkriterien, join_interessen,
};

/// Enum lookup result that keeps unresolvable codes explicit.
///
/// An unresolved code is not an error: the filter is valid but matches no
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumFilter<T> {
    Resolved(T),
    Unresolved(String),
}

impl<T: Copy + PartialEq> EnumFilter<T> {
    fn matches(&self, actual: Option<T>) -> bool {
        match self {
            Self::Resolved(expected) => actual == Some(*expected),
            Self::Unresolved(_) => false,
        }
    }
}

/// One typed filter on a customer attribute.
///
/// String payloads of the substring variants are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KundeFilter {
    NachnameContains(String),
    EmailContains(String),
    Kategorie(i32),
    Newsletter(bool),
    Geschlecht(EnumFilter<GeschlechtType>),
    Familienstand(EnumFilter<FamilienstandType>),
    /// Presence of the tag name in the stored interest list.
    Interesse(InteresseType),
    PlzPrefix(String),
    OrtContains(String),
}

impl KundeFilter {
    /// Evaluate the filter against an in-memory customer.
    pub fn matches(&self, kunde: &Kunde) -> bool {
        match self {
            Self::NachnameContains(teil) => kunde.nachname.to_lowercase().contains(teil.as_str()),
            Self::EmailContains(teil) => kunde.email.to_lowercase().contains(teil.as_str()),
            Self::Kategorie(kategorie) => kunde.kategorie == *kategorie,
            Self::Newsletter(flag) => kunde.has_newsletter == *flag,
            Self::Geschlecht(filter) => filter.matches(kunde.geschlecht),
            Self::Familienstand(filter) => filter.matches(kunde.familienstand),
            Self::Interesse(tag) => join_interessen(kunde.interessen_or_empty())
                .is_some_and(|stored| stored.contains(tag.name())),
            Self::PlzPrefix(prefix) => kunde
                .adresse
                .as_ref()
                .is_some_and(|adresse| adresse.plz.starts_with(prefix.as_str())),
            Self::OrtContains(teil) => kunde
                .adresse
                .as_ref()
                .is_some_and(|adresse| adresse.ort.to_lowercase().contains(teil.as_str())),
        }
    }
}

/// Conjunction tree of filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KundePredicate {
    Filter(KundeFilter),
    And(Box<KundePredicate>, Box<KundePredicate>),
}

impl KundePredicate {
    /// Combine `self` and `other` with a logical AND.
    #[must_use]
    pub fn and(self, other: KundePredicate) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Evaluate the predicate against an in-memory customer.
    pub fn matches(&self, kunde: &Kunde) -> bool {
        match self {
            Self::Filter(filter) => filter.matches(kunde),
            Self::And(left, right) => left.matches(kunde) && right.matches(kunde),
        }
    }

    /// Leaf filters in evaluation order.
    pub fn filters(&self) -> Vec<&KundeFilter> {
        match self {
            Self::Filter(filter) => vec![filter],
            Self::And(left, right) => {
                let mut filters = left.filters();
                filters.extend(right.filters());
                filters
            }
        }
    }
}

impl From<KundeFilter> for KundePredicate {
    fn from(value: KundeFilter) -> Self {
        Self::Filter(value)
    }
}

/// Reasons why criteria yield no predicate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    #[error("no search criteria given")]
    Empty,
    #[error("unknown search key: {key}")]
    UnknownKey { key: String },
    #[error("search key {key} accepts exactly one value, got {count}")]
    MultipleValues { key: String, count: usize },
    #[error("kategorie is not an integer: {value}")]
    InvalidKategorie {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("none of the interesse values resolves to a known tag")]
    NoResolvableInteresse,
}

/// Builds a [`KundePredicate`] from search criteria.
#[derive(Debug, Default, Clone, Copy)]
pub struct PredicateBuilder;

impl PredicateBuilder {
    /// Compose all criteria with AND in key order.
    ///
    /// Any failing key fails the whole build.
    ///
    /// # Examples
    /// ```
    /// use kunde::domain::{PredicateBuilder, PredicateError, Suchkriterien};
    ///
    /// let ok = PredicateBuilder.build(&Suchkriterien::from_pairs([("nachname", "al"), ("plz", "7")]));
    /// assert!(ok.is_ok());
    ///
    /// let err = PredicateBuilder.build(&Suchkriterien::from_pairs([("farbe", "rot")]));
    /// assert!(matches!(err, Err(PredicateError::UnknownKey { .. })));
    /// ```
    pub fn build(&self, kriterien: &Suchkriterien) -> Result<KundePredicate, PredicateError> {
        debug!(?kriterien, "building search predicate");
        let mut predicates = kriterien
            .iter()
            .map(|(key, values)| Self::to_predicate(key, values));

        let first = predicates.next().ok_or(PredicateError::Empty)??;
        predicates.try_fold(first, |acc, next| Ok(acc.and(next?)))
    }

    fn to_predicate(key: &str, values: &[String]) -> Result<KundePredicate, PredicateError> {
        trace!(key, ?values, "translating search criterion");
        if key == "interesse" {
            return Self::interessen(values);
        }

        let value = match values {
            [value] => value.as_str(),
            _ => {
                return Err(PredicateError::MultipleValues {
                    key: key.to_owned(),
                    count: values.len(),
                });
            }
        };

        let filter = match key {
            "nachname" => KundeFilter::NachnameContains(value.to_lowercase()),
            "email" => KundeFilter::EmailContains(value.to_lowercase()),
            "kategorie" => KundeFilter::Kategorie(value.parse().map_err(|source| {
                PredicateError::InvalidKategorie {
                    value: value.to_owned(),
                    source,
                }
            })?),
            "newsletter" => KundeFilter::Newsletter(value.eq_ignore_ascii_case("true")),
            "geschlecht" => KundeFilter::Geschlecht(resolve(value, GeschlechtType::of)),
            "familienstand" => KundeFilter::Familienstand(resolve(value, FamilienstandType::of)),
            "plz" => KundeFilter::PlzPrefix(value.to_owned()),
            "ort" => KundeFilter::OrtContains(value.to_lowercase()),
            _ => {
                return Err(PredicateError::UnknownKey {
                    key: key.to_owned(),
                });
            }
        };
        Ok(filter.into())
    }

    fn interessen(values: &[String]) -> Result<KundePredicate, PredicateError> {
        values
            .iter()
            .filter_map(|value| InteresseType::of(value))
            .map(|tag| KundePredicate::from(KundeFilter::Interesse(tag)))
            .reduce(KundePredicate::and)
            .ok_or(PredicateError::NoResolvableInteresse)
    }
}

fn resolve<T>(code: &str, of: impl Fn(&str) -> Option<T>) -> EnumFilter<T> {
    of(code).map_or_else(|| EnumFilter::Unresolved(code.to_owned()), EnumFilter::Resolved)
}
