//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! `DieselKundeRepository` and `DieselLoginRepository` implement the driven
//! ports on top of `diesel-async` with a `bb8` pool. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) stay private; only
//! domain types cross the module boundary, and Diesel failures arrive as
//! port errors.
//!
//! # Example
//!
//! ```no_run
//! use kunde::outbound::persistence::{DbPool, DieselKundeRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), kunde::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/kunde")).await?;
//! let repo = DieselKundeRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

pub(crate) mod diesel_helpers;
mod diesel_kunde_repository;
mod diesel_login_repository;
mod models;
mod pool;
mod schema;

pub use diesel_kunde_repository::DieselKundeRepository;
pub use diesel_login_repository::DieselLoginRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
