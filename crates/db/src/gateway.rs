//! The `Gateway` trait — the contract between the repositories and the store.
//!
//! Repositories never touch a pool directly. They are handed a gateway at
//! construction time, which lets tests swap in [`crate::mock::InMemoryGateway`]
//! while production code uses [`crate::postgres::PgGateway`].
//!
//! Single-row lookups return `Ok(None)` when nothing matched; the repositories
//! decide how that surfaces to callers.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewReservation, NewUser, ReservationRow, UserRow};
use crate::DbError;

#[async_trait]
pub trait Gateway: Send + Sync {
    type Transaction: GatewayTransaction;

    /// Open a transaction. It must be finished with `commit` or `rollback`.
    async fn begin(&self) -> Result<Self::Transaction, DbError>;

    // ------ reservations ------

    /// Every reservation, newest `created_at` first.
    async fn query_reservations(&self) -> Result<Vec<ReservationRow>, DbError>;

    async fn query_reservation_by_id(&self, id: Uuid) -> Result<Option<ReservationRow>, DbError>;

    /// First reservation the store returns for `user_id`.
    async fn query_reservation_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ReservationRow>, DbError>;

    // ------ users ------

    /// Every user, newest `created_at` first.
    async fn query_users(&self) -> Result<Vec<UserRow>, DbError>;

    async fn query_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>, DbError>;

    async fn query_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError>;

    /// Exact match on both columns.
    async fn query_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRow>, DbError>;

    /// Single-statement insert outside any transaction.
    async fn exec_insert_user(&self, user: &NewUser) -> Result<(), DbError>;
}

/// An open transaction handed out by [`Gateway::begin`].
#[async_trait]
pub trait GatewayTransaction: Send {
    /// Insert a reservation and return the id the store generated.
    async fn insert_reservation(&mut self, reservation: &NewReservation) -> Result<Uuid, DbError>;

    async fn commit(self) -> Result<(), DbError>;

    async fn rollback(self) -> Result<(), DbError>;
}
