//! `InMemoryGateway` — a test double for [`Gateway`].
//!
//! Behaves like the real tables closely enough for repository tests:
//! server-generated ids and timestamps, `created_at DESC` ordering, a unique
//! `users.email`, a foreign key from `reservations.user_id` to `users.id`, and
//! reservation inserts that only become visible on commit. Failures can be
//! injected per primitive, and every finished transaction is recorded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::gateway::{Gateway, GatewayTransaction};
use crate::models::{NewReservation, NewUser, ReservationRow, UserRow};
use crate::DbError;

/// Which gateway primitives should fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Failures {
    /// Every read query and the user insert.
    pub queries: bool,
    pub begin: bool,
    pub insert: bool,
    pub commit: bool,
    pub rollback: bool,
}

/// How a transaction handed out by the gateway ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    RolledBack,
    CommitFailed,
    RollbackFailed,
}

#[derive(Debug)]
struct StoredUser {
    row: UserRow,
    password: String,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<StoredUser>,
    reservations: Vec<ReservationRow>,
    last_timestamp: Option<DateTime<Utc>>,
    failures: Failures,
    begun: usize,
    outcomes: Vec<TxOutcome>,
}

impl State {
    /// Wall-clock `NOW()`, nudged forward so consecutive rows never tie.
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }
}

fn store_error(msg: &str) -> DbError {
    DbError::Sqlx(sqlx::Error::Protocol(msg.to_owned()))
}

/// In-memory stand-in for the `users` and `reservations` tables. Clones share
/// the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<State>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a user directly, bypassing failure injection.
    pub fn seed_user(&self, name: &str, email: &str, password: &str) -> UserRow {
        let mut state = self.lock();
        let now = state.now();
        let row = UserRow {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            email: email.to_owned(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(StoredUser {
            row: row.clone(),
            password: password.to_owned(),
        });
        row
    }

    pub fn set_failures(&self, failures: Failures) {
        self.lock().failures = failures;
    }

    /// Number of times `begin` was called, successful or not.
    pub fn begin_count(&self) -> usize {
        self.lock().begun
    }

    pub fn transaction_outcomes(&self) -> Vec<TxOutcome> {
        self.lock().outcomes.clone()
    }

    pub fn reservation_count(&self) -> usize {
        self.lock().reservations.len()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// The stored password for `email`, as the column holds it.
    pub fn stored_password(&self, email: &str) -> Option<String> {
        self.lock()
            .users
            .iter()
            .find(|u| u.row.email == email)
            .map(|u| u.password.clone())
    }

    fn check_queries(&self) -> Result<MutexGuard<'_, State>, DbError> {
        let state = self.lock();
        if state.failures.queries {
            return Err(store_error("connection refused"));
        }
        Ok(state)
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DbError> {
        let mut state = self.lock();
        state.begun += 1;
        if state.failures.begin {
            return Err(store_error("could not begin transaction"));
        }
        Ok(InMemoryTransaction {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
        })
    }

    async fn query_reservations(&self) -> Result<Vec<ReservationRow>, DbError> {
        let state = self.check_queries()?;
        let mut rows = state.reservations.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn query_reservation_by_id(&self, id: Uuid) -> Result<Option<ReservationRow>, DbError> {
        let state = self.check_queries()?;
        Ok(state.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn query_reservation_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ReservationRow>, DbError> {
        let state = self.check_queries()?;
        Ok(state
            .reservations
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn query_users(&self) -> Result<Vec<UserRow>, DbError> {
        let state = self.check_queries()?;
        let mut rows: Vec<UserRow> = state.users.iter().map(|u| u.row.clone()).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn query_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>, DbError> {
        let state = self.check_queries()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.row.id == id)
            .map(|u| u.row.clone()))
    }

    async fn query_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
        let state = self.check_queries()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.row.email == email)
            .map(|u| u.row.clone()))
    }

    async fn query_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRow>, DbError> {
        let state = self.check_queries()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.row.email == email && u.password == password)
            .map(|u| u.row.clone()))
    }

    async fn exec_insert_user(&self, user: &NewUser) -> Result<(), DbError> {
        let mut state = self.check_queries()?;
        if state.users.iter().any(|u| u.row.email == user.email) {
            return Err(store_error(
                "duplicate key value violates unique constraint \"users_email_key\"",
            ));
        }
        let now = state.now();
        state.users.push(StoredUser {
            row: UserRow {
                id: Uuid::new_v4(),
                name: user.name.clone(),
                email: user.email.clone(),
                created_at: now,
                updated_at: now,
            },
            password: user.password.clone(),
        });
        Ok(())
    }
}

/// Transaction over [`InMemoryGateway`]. Inserted rows stay private to the
/// transaction until `commit`.
#[derive(Debug)]
pub struct InMemoryTransaction {
    state: Arc<Mutex<State>>,
    pending: Vec<ReservationRow>,
}

impl InMemoryTransaction {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GatewayTransaction for InMemoryTransaction {
    async fn insert_reservation(&mut self, reservation: &NewReservation) -> Result<Uuid, DbError> {
        let row = {
            let mut state = self.lock();
            if state.failures.insert {
                return Err(store_error("insert into reservations failed"));
            }
            if !state.users.iter().any(|u| u.row.id == reservation.user_id) {
                return Err(store_error(
                    "insert or update on table \"reservations\" violates foreign key constraint \"reservations_user_id_fkey\"",
                ));
            }
            let now = state.now();
            ReservationRow {
                id: Uuid::new_v4(),
                user_id: reservation.user_id,
                reservation_date: reservation.reservation_date,
                num_people: reservation.num_people,
                special_request: Some(reservation.special_request.clone()),
                status: reservation.status.clone(),
                created_at: now,
                updated_at: now,
            }
        };
        let id = row.id;
        self.pending.push(row);
        Ok(id)
    }

    async fn commit(self) -> Result<(), DbError> {
        let mut state = self.lock();
        if state.failures.commit {
            state.outcomes.push(TxOutcome::CommitFailed);
            return Err(store_error("could not commit transaction"));
        }
        state.reservations.extend(self.pending.iter().cloned());
        state.outcomes.push(TxOutcome::Committed);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        let mut state = self.lock();
        if state.failures.rollback {
            state.outcomes.push(TxOutcome::RollbackFailed);
            return Err(store_error("could not roll back transaction"));
        }
        state.outcomes.push(TxOutcome::RolledBack);
        Ok(())
    }
}
