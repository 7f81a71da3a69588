//! HTTP inbound adapter exposing the customer REST API.

pub mod auth;
pub mod error;
pub mod health;
pub mod kunden;
pub mod login;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
