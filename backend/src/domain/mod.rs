//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the customer aggregate, its search and patch languages,
//! and the services behind the driving ports. Nothing here knows about
//! HTTP or SQL; adapters talk to the domain through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) - API error response payload.
//! - Kunde (alias to `kunde::Kunde`) - the customer aggregate.
//! - KundeReadService / KundeWriteService - customer use-cases.
//! - AuthService - credential checks for Basic authentication.

pub mod auth;
pub mod error;
pub mod kunde;
pub mod kunde_read_service;
pub(crate) mod kunde_service_support;
pub mod kunde_write_service;
pub mod login;
pub mod login_service;
pub mod mail;
pub mod patch;
pub mod ports;
pub mod predicate;
pub mod suchkriterien;
pub mod trace_id;
pub mod version;

pub use self::auth::{
    AuthenticatedUser, LoginCredentials, LoginValidationError, Rolle, UnknownRolle, join_rollen,
    split_rollen,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::kunde::{
    Adresse, ConstraintViolation, FamilienstandType, GeschlechtType, InteresseType,
    InvalidWaehrung, Kunde, KundeId, MAX_EMAIL_LEN, MAX_KATEGORIE, MAX_NACHNAME_LEN,
    MAX_USERNAME_LEN, MIN_KATEGORIE, Umsatz, UnknownCodeError, Waehrung, join_interessen,
    split_interessen, validate_kunde,
};
pub use self::kunde_read_service::KundeReadService;
pub use self::kunde_write_service::KundeWriteService;
pub use self::login::{Login, MIN_PASSWORD_LEN, NewLogin, is_strong_password};
pub use self::login_service::AuthService;
pub use self::mail::MailMessage;
pub use self::patch::{
    EMAIL_PATH, INTERESSEN_PATH, KundePatcher, NACHNAME_PATH, PatchError, PatchFailure,
    PatchOperation, PatchOperationType,
};
pub use self::predicate::{
    EnumFilter, KundeFilter, KundePredicate, PredicateBuilder, PredicateError,
};
pub use self::suchkriterien::Suchkriterien;
pub use self::trace_id::TraceId;
pub use self::version::{VersionError, ensure_current, etag, parse_version};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use kunde::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
