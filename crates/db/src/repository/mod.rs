//! Repositories — one function per database operation.
//!
//! Every operation goes through a [`crate::Gateway`] and returns a
//! `Result<T, DbError>`. No business logic lives here.

pub mod reservations;
pub mod users;

pub use reservations::ReservationRepository;
