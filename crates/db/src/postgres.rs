//! `PgGateway` — the Postgres-backed [`Gateway`].
//!
//! Queries use the runtime-checked `sqlx::query_as` API so the crate builds
//! without a live database or an offline query cache.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::gateway::{Gateway, GatewayTransaction};
use crate::models::{NewReservation, NewUser, ReservationRow, UserRow};
use crate::{DbError, DbPool};

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

const SELECT_RESERVATIONS: &str = r#"
    SELECT id, user_id, reservation_date, num_people, special_request, status, created_at, updated_at
    FROM reservations
    ORDER BY created_at DESC
"#;

const SELECT_RESERVATION_BY_ID: &str = r#"
    SELECT id, user_id, reservation_date, num_people, special_request, status, created_at, updated_at
    FROM reservations
    WHERE id = $1
"#;

const SELECT_RESERVATION_BY_USER_ID: &str = r#"
    SELECT id, user_id, reservation_date, num_people, special_request, status, created_at, updated_at
    FROM reservations
    WHERE user_id = $1
"#;

const INSERT_RESERVATION: &str = r#"
    INSERT INTO reservations (user_id, reservation_date, num_people, special_request, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
    RETURNING id
"#;

const SELECT_USERS: &str = r#"
    SELECT id, name, email, created_at, updated_at
    FROM users
    ORDER BY created_at DESC
"#;

const SELECT_USER_BY_CREDENTIALS: &str = r#"
    SELECT id, name, email, created_at, updated_at
    FROM users
    WHERE email = $1 AND password = $2
    LIMIT 1
"#;

const SELECT_USER_BY_ID: &str = r#"
    SELECT id, name, email, created_at, updated_at
    FROM users
    WHERE id = $1
    LIMIT 1
"#;

const SELECT_USER_BY_EMAIL: &str = r#"
    SELECT id, name, email, created_at, updated_at
    FROM users
    WHERE email = $1
    LIMIT 1
"#;

const INSERT_USER: &str = r#"
    INSERT INTO users (name, email, password, created_at, updated_at)
    VALUES ($1, $2, $3, NOW(), NOW())
"#;

// ---------------------------------------------------------------------------
// PgGateway
// ---------------------------------------------------------------------------

/// Gateway over a shared Postgres pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: DbPool,
}

impl PgGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Gateway for PgGateway {
    type Transaction = PgGatewayTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DbError> {
        let tx = self.pool.begin().await?;
        Ok(PgGatewayTransaction { tx })
    }

    async fn query_reservations(&self) -> Result<Vec<ReservationRow>, DbError> {
        let rows = sqlx::query_as::<_, ReservationRow>(SELECT_RESERVATIONS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn query_reservation_by_id(&self, id: Uuid) -> Result<Option<ReservationRow>, DbError> {
        let row = sqlx::query_as::<_, ReservationRow>(SELECT_RESERVATION_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn query_reservation_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ReservationRow>, DbError> {
        let row = sqlx::query_as::<_, ReservationRow>(SELECT_RESERVATION_BY_USER_ID)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn query_users(&self) -> Result<Vec<UserRow>, DbError> {
        let rows = sqlx::query_as::<_, UserRow>(SELECT_USERS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn query_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(SELECT_USER_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn query_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(SELECT_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn query_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRow>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(SELECT_USER_BY_CREDENTIALS)
            .bind(email)
            .bind(password)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exec_insert_user(&self, user: &NewUser) -> Result<(), DbError> {
        sqlx::query(INSERT_USER)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// A Postgres transaction. sqlx rolls it back if it is dropped unfinished.
pub struct PgGatewayTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl GatewayTransaction for PgGatewayTransaction {
    async fn insert_reservation(&mut self, reservation: &NewReservation) -> Result<Uuid, DbError> {
        let id = sqlx::query_scalar::<_, Uuid>(INSERT_RESERVATION)
            .bind(reservation.user_id)
            .bind(reservation.reservation_date)
            .bind(reservation.num_people)
            .bind(&reservation.special_request)
            .bind(&reservation.status)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(id)
    }

    async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
