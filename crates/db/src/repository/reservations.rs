//! Reservation repository.

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::gateway::{Gateway, GatewayTransaction};
use crate::models::{NewReservation, ReservationRow};
use crate::DbError;

/// Read and create reservations through an injected [`Gateway`].
#[derive(Debug, Clone)]
pub struct ReservationRepository<G> {
    gateway: G,
}

impl<G: Gateway> ReservationRepository<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Return all reservations ordered by creation time (newest first).
    #[instrument(skip(self))]
    pub async fn fetch_reservations(&self) -> Result<Vec<ReservationRow>, DbError> {
        info!("Fetching reservations");
        let rows = self
            .gateway
            .query_reservations()
            .await
            .inspect_err(|e| error!("Failed to fetch reservations: {e}"))?;
        info!("Fetched {} reservations", rows.len());
        Ok(rows)
    }

    /// Fetch a single reservation by its primary key.
    #[instrument(skip(self))]
    pub async fn fetch_reservation_by_id(&self, id: Uuid) -> Result<ReservationRow, DbError> {
        debug!("Looking up reservation");
        let row = self
            .gateway
            .query_reservation_by_id(id)
            .await
            .inspect_err(|e| error!("Failed to fetch reservation: {e}"))?
            .ok_or(DbError::NotFound)
            .inspect_err(|_| warn!("Reservation not found"))?;
        debug!(user_id = %row.user_id, status = %row.status, "Reservation found");
        Ok(row)
    }

    /// Fetch the reservation held by `user_id`.
    ///
    /// A user with several reservations gets whichever row the store returns
    /// first; use [`Self::fetch_reservations`] to see all of them.
    #[instrument(skip(self))]
    pub async fn fetch_reservation_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<ReservationRow, DbError> {
        debug!("Looking up reservation for user");
        let row = self
            .gateway
            .query_reservation_by_user_id(user_id)
            .await
            .inspect_err(|e| error!("Failed to fetch reservation: {e}"))?
            .ok_or(DbError::NotFound)
            .inspect_err(|_| warn!("No reservation for user"))?;
        debug!(id = %row.id, status = %row.status, "Reservation found");
        Ok(row)
    }

    /// Validate the input, then insert it in its own transaction and return the
    /// generated id.
    ///
    /// Nothing reaches the store when validation fails. Once the transaction
    /// is open it is committed on success and rolled back on any error before
    /// this returns. A failed rollback is logged and the insert error returned.
    #[instrument(skip(self, special_request))]
    pub async fn create_reservation(
        &self,
        user_id: &str,
        reservation_date: &str,
        num_people: i32,
        special_request: &str,
        status: &str,
    ) -> Result<Uuid, DbError> {
        info!("Creating reservation");

        let reservation =
            NewReservation::parse(user_id, reservation_date, num_people, special_request, status)
                .inspect_err(|e| warn!("Rejected reservation: {e}"))?;

        let mut tx = self
            .gateway
            .begin()
            .await
            .inspect_err(|e| error!("Failed to begin transaction: {e}"))?;

        let inserted = tx.insert_reservation(&reservation).await;
        match inserted {
            Ok(id) => {
                debug!("Committing transaction");
                tx.commit()
                    .await
                    .inspect_err(|e| error!("Failed to commit transaction: {e}"))?;
                info!(%id, "Reservation created");
                Ok(id)
            }
            Err(e) => {
                error!("Failed to create reservation: {e}");
                debug!("Rolling back transaction");
                if let Err(rollback_err) = tx.rollback().await {
                    error!("Failed to roll back transaction: {rollback_err}");
                }
                Err(e)
            }
        }
    }
}
