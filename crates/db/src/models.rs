//! Row structs that map 1-to-1 onto database tables, plus the validated
//! inputs the repositories hand to the gateway for inserts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// reservations
// ---------------------------------------------------------------------------

/// A persisted reservation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReservationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reservation_date: DateTime<Utc>,
    pub num_people: i32,
    pub special_request: Option<String>,
    /// Free-text state such as `pending` or `confirmed`.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reservation that passed pre-flight validation and is ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub user_id: Uuid,
    pub reservation_date: DateTime<Utc>,
    pub num_people: i32,
    pub special_request: String,
    pub status: String,
}

impl NewReservation {
    /// Validate raw caller input.
    ///
    /// Every field is required and `num_people` must be positive. The date is
    /// accepted as RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a
    /// bare `YYYY-MM-DD`; forms without an offset are read as UTC.
    pub fn parse(
        user_id: &str,
        reservation_date: &str,
        num_people: i32,
        special_request: &str,
        status: &str,
    ) -> Result<Self, DbError> {
        let missing = [user_id, reservation_date, special_request, status]
            .iter()
            .any(|field| field.is_empty());
        if missing || num_people <= 0 {
            return Err(DbError::Validation(
                "user_id, reservation_date, num_people, special_request and status are required"
                    .into(),
            ));
        }

        let user_id = Uuid::parse_str(user_id.trim())
            .map_err(|e| DbError::Validation(format!("invalid user_id '{user_id}': {e}")))?;
        let reservation_date = parse_reservation_date(reservation_date.trim()).ok_or_else(|| {
            DbError::Validation(format!("invalid reservation_date '{reservation_date}'"))
        })?;

        Ok(Self {
            user_id,
            reservation_date,
            num_people,
            special_request: special_request.to_owned(),
            status: status.to_owned(),
        })
    }
}

fn parse_reservation_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

/// A persisted user row. The password column is never selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a user insert. Stored exactly as given.
#[derive(Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
