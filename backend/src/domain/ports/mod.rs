//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`Mailer`], [`PasswordHasher`]) are
//! implemented by outbound adapters. Driving ports ([`KundeQuery`],
//! [`KundeCommand`], [`LoginService`]) are implemented by domain services
//! and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod kunde_command;
mod kunde_query;
mod kunde_repository;
mod login_repository;
mod login_service;
mod mailer;
mod password_hasher;

#[cfg(test)]
pub use kunde_command::MockKundeCommand;
pub use kunde_command::KundeCommand;
#[cfg(test)]
pub use kunde_query::MockKundeQuery;
pub use kunde_query::KundeQuery;
#[cfg(test)]
pub use kunde_repository::MockKundeRepository;
pub use kunde_repository::{KundeRepository, KundeRepositoryError};
#[cfg(test)]
pub use login_repository::MockLoginRepository;
pub use login_repository::{LoginRepository, LoginRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
