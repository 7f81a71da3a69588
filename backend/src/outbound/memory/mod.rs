//! In-memory adapters for running without PostgreSQL.
//!
//! Both stores implement the same ports as the Diesel adapters and share
//! their semantics, so the HTTP tests exercise the real services end to
//! end.

mod kunde_repository;
mod login_repository;

pub use kunde_repository::InMemoryKundeRepository;
pub use login_repository::InMemoryLoginRepository;
