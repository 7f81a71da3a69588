//! Optimistic concurrency guard for conditional writes.
//!
//! Clients echo the last seen version as a quoted entity tag (`"3"`). The
//! guard turns that header into a number, or into one of three distinct
//! failures that adapters map to 428 or 412.

use std::num::ParseIntError;

use serde_json::json;
use tracing::trace;

use crate::domain::Error;

/// Failures of the version guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// No version token was sent.
    #[error("Versionsnummer fehlt")]
    Required,
    /// The token is not a quoted integer.
    #[error("Ungueltiges ETag {token}")]
    Invalid {
        token: String,
        #[source]
        source: Option<ParseIntError>,
    },
    /// The token names another version than the stored one. Negative
    /// tokens parse and always land here.
    #[error("Die Versionsnummer {expected} ist veraltet.")]
    Outdated { expected: i64, actual: u32 },
}

impl From<VersionError> for Error {
    fn from(value: VersionError) -> Self {
        let message = value.to_string();
        match value {
            VersionError::Required => Error::precondition_required(message),
            VersionError::Invalid { token, .. } => Error::precondition_failed(message)
                .with_details(json!({ "code": "version_invalid", "token": token })),
            VersionError::Outdated { expected, actual } => Error::precondition_failed(message)
                .with_details(json!({
                    "code": "version_outdated",
                    "expectedVersion": expected,
                    "actualVersion": actual,
                })),
        }
    }
}

/// Parse an `If-Match` style token into a version number.
///
/// # Examples
/// ```
/// use kunde::domain::{VersionError, parse_version};
///
/// assert_eq!(parse_version(Some("\"4\"")), Ok(4));
/// assert_eq!(parse_version(None), Err(VersionError::Required));
/// assert!(matches!(parse_version(Some("4")), Err(VersionError::Invalid { .. })));
/// ```
pub fn parse_version(token: Option<&str>) -> Result<i64, VersionError> {
    let token = token.ok_or(VersionError::Required)?;
    trace!(token, "parsing version token");

    let invalid = |source| VersionError::Invalid {
        token: token.to_owned(),
        source,
    };
    if token.len() < 3 || !token.starts_with('"') || !token.ends_with('"') {
        return Err(invalid(None));
    }

    token[1..token.len() - 1]
        .parse()
        .map_err(|err| invalid(Some(err)))
}

/// Reject the write unless `expected` equals the stored version.
pub fn ensure_current(expected: i64, actual: u32) -> Result<(), VersionError> {
    if expected == i64::from(actual) {
        Ok(())
    } else {
        Err(VersionError::Outdated { expected, actual })
    }
}

/// Render a version as a quoted entity tag.
pub fn etag(version: u32) -> String {
    format!("\"{version}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("\"0\"", 0)]
    #[case("\"17\"", 17)]
    #[case("\"+2\"", 2)]
    fn accepts_quoted_integers(#[case] token: &str, #[case] expected: i64) {
        assert_eq!(parse_version(Some(token)), Ok(expected));
    }

    #[rstest]
    #[case("1")]
    #[case("\"\"")]
    #[case("\"1")]
    #[case("1\"")]
    #[case("'1'")]
    fn malformed_tokens_are_invalid_without_cause(#[case] token: &str) {
        let err = parse_version(Some(token)).expect_err("malformed token");
        assert_eq!(
            err,
            VersionError::Invalid {
                token: token.to_owned(),
                source: None
            }
        );
        assert_eq!(err.to_string(), format!("Ungueltiges ETag {token}"));
    }

    #[rstest]
    #[case("\"abc\"")]
    #[case("\"1.0\"")]
    #[case("\"99999999999999999999\"")]
    fn unparsable_numbers_chain_the_parse_error(#[case] token: &str) {
        let err = parse_version(Some(token)).expect_err("not a number");
        assert!(matches!(
            &err,
            VersionError::Invalid {
                source: Some(_),
                ..
            }
        ));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_token_is_required() {
        let err = parse_version(None).expect_err("no token");
        assert_eq!(err.to_string(), "Versionsnummer fehlt");
        assert_eq!(Error::from(err).code(), ErrorCode::PreconditionRequired);
    }

    #[test]
    fn stale_token_is_outdated() {
        let expected = parse_version(Some("\"0\"")).expect("valid token");
        let err = ensure_current(expected, 1).expect_err("stored version is newer");
        assert_eq!(
            err,
            VersionError::Outdated {
                expected: 0,
                actual: 1
            }
        );
        assert_eq!(Error::from(err).code(), ErrorCode::PreconditionFailed);
    }

    #[test]
    fn negative_token_is_outdated_not_invalid() {
        let expected = parse_version(Some("\"-1\"")).expect("signed token parses");
        let err = ensure_current(expected, 0).expect_err("no version is negative");
        assert_eq!(
            err,
            VersionError::Outdated {
                expected: -1,
                actual: 0
            }
        );
        assert_eq!(err.to_string(), "Die Versionsnummer -1 ist veraltet.");
    }

    #[test]
    fn etag_quotes_the_version() {
        assert_eq!(etag(3), "\"3\"");
        assert_eq!(parse_version(Some(&etag(3))), Ok(3));
    }
}
