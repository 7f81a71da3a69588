//! Shared helpers for the Diesel repositories.
//!
//! - Error mapping from pool and Diesel errors into port errors
//! - Version casting between database and domain types
//! - LIKE pattern escaping for the substring and prefix searches

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Outcome classes of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    Connection(&'static str),
    Query(&'static str),
    /// A unique constraint fired; carries the constraint name when known.
    UniqueViolation(Option<String>),
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: diesel::result::Error) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(_, _) => DieselFailure::Query("database error"),
        _ => DieselFailure::Query("database error"),
    }
}

/// Cast the stored version (i32) to the domain version (u32).
#[expect(
    clippy::cast_sign_loss,
    reason = "a check constraint keeps versions non-negative"
)]
pub(crate) fn cast_version(version: i32) -> u32 {
    version as u32
}

/// Cast the domain version (u32) to the stored version (i32).
#[expect(
    clippy::cast_possible_wrap,
    reason = "versions grow by one per update and stay far below i32::MAX"
)]
pub(crate) fn cast_version_for_db(version: u32) -> i32 {
    version as i32
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
///
/// PostgreSQL uses `\` as the default LIKE escape character.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `%raw%` with `raw` escaped.
pub(crate) fn contains_pattern(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

/// `raw%` with `raw` escaped.
pub(crate) fn prefix_pattern(raw: &str) -> String {
    format!("{}%", escape_like(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("alpha", "alpha")]
    #[case::percent("50%", "50\\%")]
    #[case::underscore("a_b", "a\\_b")]
    #[case::backslash("a\\b", "a\\\\b")]
    fn like_metacharacters_are_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_like(raw), expected);
    }

    #[rstest]
    fn patterns_wrap_the_escaped_value() {
        assert_eq!(contains_pattern("a_"), "%a\\_%");
        assert_eq!(prefix_pattern("7"), "7%");
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify_diesel_error(diesel::result::Error::NotFound),
            DieselFailure::Query("record not found")
        );
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped: String = map_pool_error(PoolError::checkout("timed out"), |m| m);
        assert_eq!(mapped, "timed out");
    }

    #[rstest]
    #[case(0)]
    #[case(41)]
    fn versions_survive_the_cast(#[case] version: u32) {
        assert_eq!(cast_version(cast_version_for_db(version)), version);
    }
}
