//! Stored logins and the password policy for new registrations.

use std::fmt;

use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::Rolle;

/// Minimum number of characters in a password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Persisted login with a hashed password.
#[derive(Clone, PartialEq, Eq)]
pub struct Login {
    pub id: Uuid,
    /// Lower-cased user name.
    pub username: String,
    pub password_hash: String,
    pub rollen: Vec<Rolle>,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("rollen", &self.rollen)
            .finish_non_exhaustive()
    }
}

/// Registration request for a new login.
#[derive(Clone)]
pub struct NewLogin {
    username: String,
    password: Zeroizing<String>,
    rollen: Vec<Rolle>,
}

impl NewLogin {
    /// New customer login carrying the `KUNDE` role.
    pub fn kunde(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_rollen(username, password, vec![Rolle::Kunde])
    }

    pub fn with_rollen(
        username: impl Into<String>,
        password: impl Into<String>,
        rollen: Vec<Rolle>,
    ) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
            rollen,
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn rollen(&self) -> &[Rolle] {
        &self.rollen
    }
}

impl fmt::Debug for NewLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewLogin")
            .field("username", &self.username)
            .field("rollen", &self.rollen)
            .finish_non_exhaustive()
    }
}

/// Whether `password` satisfies the registration policy.
///
/// The password needs at least [`MIN_PASSWORD_LEN`] characters and one
/// each of: ASCII upper case, ASCII lower case, digit, ASCII punctuation.
///
/// # Examples
/// ```
/// use kunde::domain::is_strong_password;
///
/// assert!(is_strong_password("Pass1234!"));
/// assert!(!is_strong_password("password"));
/// ```
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_punctuation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Pass1234!", true)]
    #[case("aB3~efgh", true)]
    #[case("Pa1!", false)]
    #[case("pass1234!", false)]
    #[case("PASS1234!", false)]
    #[case("Password!", false)]
    #[case("Password1", false)]
    #[case("Pässwört1", false)]
    fn password_policy(#[case] password: &str, #[case] strong: bool) {
        assert_eq!(is_strong_password(password), strong);
    }

    #[test]
    fn debug_output_omits_secrets() {
        let login = NewLogin::kunde("alpha", "Pass1234!");
        let rendered = format!("{login:?}");
        assert!(!rendered.contains("Pass1234!"));
        assert_eq!(login.rollen(), &[Rolle::Kunde]);
    }
}
