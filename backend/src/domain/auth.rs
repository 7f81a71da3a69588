//! Authentication primitives: credentials, roles and the authenticated
//! principal.
//!
//! Inbound adapters decode transport specific credentials (HTTP Basic,
//! JSON login bodies) into [`LoginCredentials`] and hand them to the
//! [`crate::domain::ports::LoginService`] port.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use kunde::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "p").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username as entered by the caller.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Plain text password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Authorization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rolle {
    Admin,
    Kunde,
    Actuator,
}

impl Rolle {
    /// Upper-case name used in storage and payloads.
    pub fn name(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Kunde => "KUNDE",
            Self::Actuator => "ACTUATOR",
        }
    }
}

/// Error for role names that are not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRolle(String);

impl FromStr for Rolle {
    type Err = UnknownRolle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "KUNDE" => Ok(Self::Kunde),
            "ACTUATOR" => Ok(Self::Actuator),
            other => Err(UnknownRolle(other.to_owned())),
        }
    }
}

impl fmt::Display for Rolle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Join roles for storage, e.g. `ADMIN,KUNDE`.
pub fn join_rollen(rollen: &[Rolle]) -> String {
    let names: Vec<&str> = rollen.iter().map(|rolle| rolle.name()).collect();
    names.join(",")
}

/// Parse stored roles; blank input yields no roles.
pub fn split_rollen(stored: &str) -> Result<Vec<Rolle>, UnknownRolle> {
    stored
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::parse)
        .collect()
}

/// Principal established by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    username: String,
    rollen: Vec<Rolle>,
}

impl AuthenticatedUser {
    pub fn new(username: impl Into<String>, rollen: Vec<Rolle>) -> Self {
        Self {
            username: username.into(),
            rollen,
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn rollen(&self) -> &[Rolle] {
        &self.rollen
    }

    /// Whether the principal carries `rolle`.
    pub fn has_role(&self, rolle: Rolle) -> bool {
        self.rollen.contains(&rolle)
    }

    /// Whether the principal carries any of `rollen`.
    pub fn has_any_role(&self, rollen: &[Rolle]) -> bool {
        rollen.iter().any(|rolle| self.has_role(*rolle))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Rolle::Admin)
    }
}
