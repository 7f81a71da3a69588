//! Enumerations attached to a customer record.
//!
//! Each enum has a short external code used in JSON payloads and search
//! criteria, and a stable name used by the persistence layer. Code lookups
//! ignore ASCII case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a code does not name any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCodeError {
    kind: &'static str,
    code: String,
}

impl UnknownCodeError {
    /// Enum the lookup was performed against.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The code that failed to resolve.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }
}

macro_rules! coded_enum {
    (
        $(#[$outer:meta])*
        $name:ident: $kind:literal {
            $( $(#[$variant_meta:meta])* $variant:ident => ($code:literal, $stored:literal) ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$variant_meta])* $variant, )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Short external code.
            pub fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// Stable upper-case name used for storage.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $stored,)+
                }
            }

            /// Resolve a short code, ignoring ASCII case.
            pub fn of(code: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.code().eq_ignore_ascii_case(code))
            }

            /// Resolve a stored name exactly.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|variant| variant.name() == name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::of(s).ok_or_else(|| UnknownCodeError {
                    kind: $kind,
                    code: s.to_owned(),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

coded_enum! {
    /// Gender of a customer.
    GeschlechtType: "geschlecht" {
        Maennlich => ("M", "MAENNLICH"),
        Weiblich => ("W", "WEIBLICH"),
        Divers => ("D", "DIVERS"),
    }
}

coded_enum! {
    /// Marital status of a customer.
    FamilienstandType: "familienstand" {
        Ledig => ("L", "LEDIG"),
        Verheiratet => ("VH", "VERHEIRATET"),
        Geschieden => ("G", "GESCHIEDEN"),
        Verwitwet => ("VW", "VERWITWET"),
    }
}

coded_enum! {
    /// Interest tag. Stored as the comma joined list of names.
    InteresseType: "interesse" {
        Sport => ("S", "SPORT"),
        Lesen => ("L", "LESEN"),
        Reisen => ("R", "REISEN"),
    }
}

/// Join interests into their stored representation, `None` when empty.
///
/// # Examples
/// ```
/// use kunde::domain::{InteresseType, join_interessen};
///
/// let joined = join_interessen(&[InteresseType::Sport, InteresseType::Lesen]);
/// assert_eq!(joined.as_deref(), Some("SPORT,LESEN"));
/// assert_eq!(join_interessen(&[]), None);
/// ```
pub fn join_interessen(interessen: &[InteresseType]) -> Option<String> {
    if interessen.is_empty() {
        return None;
    }
    let names: Vec<&str> = interessen.iter().map(|tag| tag.name()).collect();
    Some(names.join(","))
}

/// Parse the stored representation; `None` loads as an empty list.
pub fn split_interessen(stored: Option<&str>) -> Result<Vec<InteresseType>, UnknownCodeError> {
    let Some(stored) = stored.filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };
    stored
        .split(',')
        .map(|name| {
            InteresseType::from_name(name).ok_or_else(|| UnknownCodeError {
                kind: "interesse",
                code: name.to_owned(),
            })
        })
        .collect()
}
