//! `db` crate — pure persistence layer for the booking backend.
//!
//! Provides a connection pool, typed row structs, the [`Gateway`] seam with a
//! Postgres and an in-memory implementation, and the reservation and user
//! repositories built on top of it.

pub mod error;
pub mod gateway;
pub mod mock;
pub mod models;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use error::DbError;
pub use gateway::{Gateway, GatewayTransaction};
pub use pool::{DbConfig, DbPool};
pub use postgres::PgGateway;
pub use repository::ReservationRepository;

#[cfg(test)]
mod repository_tests;
