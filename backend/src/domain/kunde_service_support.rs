//! Error mapping and authorization shared by the customer services.

use serde_json::json;
use tracing::debug;

use crate::domain::ports::{KundeRepository, KundeRepositoryError, LoginRepositoryError};
use crate::domain::{AuthenticatedUser, Error, Kunde, KundeId, VersionError};

pub(crate) fn map_kunde_repository_error(error: KundeRepositoryError) -> Error {
    match error {
        KundeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("kunde repository unavailable: {message}"))
        }
        KundeRepositoryError::Query { message } => {
            Error::internal(format!("kunde repository error: {message}"))
        }
        KundeRepositoryError::VersionMismatch { expected, actual } => {
            VersionError::Outdated {
                expected: i64::from(expected),
                actual,
            }
            .into()
        }
        KundeRepositoryError::Missing { id } => not_found_message(&id),
        KundeRepositoryError::DuplicateEmail { email } => email_exists(&email),
    }
}

pub(crate) fn map_login_repository_error(error: LoginRepositoryError) -> Error {
    match error {
        LoginRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("login repository unavailable: {message}"))
        }
        LoginRepositoryError::Query { message } => {
            Error::internal(format!("login repository error: {message}"))
        }
        LoginRepositoryError::DuplicateUsername { username } => username_exists(&username),
    }
}

pub(crate) fn not_found(id: &KundeId) -> Error {
    not_found_message(&id.to_string())
}

fn not_found_message(id: &str) -> Error {
    Error::not_found(format!("Kein Kunde mit der ID {id} gefunden.")).with_details(json!({
        "code": "not_found",
        "id": id,
    }))
}

pub(crate) fn email_exists(email: &str) -> Error {
    Error::unprocessable_entity(format!("Die Emailadresse {email} existiert bereits."))
        .with_details(json!({ "code": "email_exists", "email": email }))
}

pub(crate) fn username_exists(username: &str) -> Error {
    Error::unprocessable_entity(format!("Der Benutzername {username} existiert bereits."))
        .with_details(json!({ "code": "username_exists", "username": username }))
}

/// Load customer `id` for `user`.
///
/// The caller's own record is always visible. Other records need the admin
/// role, and only admins learn whether a record exists at all.
pub(crate) async fn load_authorized<R>(
    repo: &R,
    id: &KundeId,
    user: &AuthenticatedUser,
) -> Result<Kunde, Error>
where
    R: KundeRepository + ?Sized,
{
    let kunde = repo
        .find_by_id(id)
        .await
        .map_err(map_kunde_repository_error)?;

    let own_record = kunde
        .as_ref()
        .is_some_and(|kunde| kunde.username.as_deref() == Some(user.username()));
    if own_record {
        return kunde.ok_or_else(|| not_found(id));
    }

    if !user.is_admin() {
        debug!(%id, username = user.username(), "rejecting read of foreign record");
        return Err(Error::forbidden("Zugriff verweigert").with_details(json!({
            "code": "access_forbidden",
            "rollen": user.rollen(),
        })));
    }

    kunde.ok_or_else(|| not_found(id))
}
