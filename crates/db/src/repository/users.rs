//! User repository functions.
//!
//! Passwords are stored and compared as given; none of these functions hash.

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::gateway::Gateway;
use crate::models::{NewUser, UserRow};
use crate::DbError;

/// Return all users ordered by creation time (newest first).
#[instrument(skip(gateway))]
pub async fn fetch_users<G: Gateway>(gateway: &G) -> Result<Vec<UserRow>, DbError> {
    info!("Fetching users");
    let rows = gateway
        .query_users()
        .await
        .inspect_err(|e| error!("Failed to fetch users: {e}"))?;
    info!("Fetched {} users", rows.len());
    Ok(rows)
}

/// Credential check: the user whose email and password both match exactly.
#[instrument(skip(gateway, password))]
pub async fn fetch_user_by_email_and_password<G: Gateway>(
    gateway: &G,
    email: &str,
    password: &str,
) -> Result<UserRow, DbError> {
    debug!("Looking up user by credentials");
    let user = gateway
        .query_user_by_credentials(email, password)
        .await
        .inspect_err(|e| error!("Failed to fetch user: {e}"))?
        .ok_or(DbError::NotFound)
        .inspect_err(|_| warn!("No user matches the given credentials"))?;
    debug!(id = %user.id, "User found");
    Ok(user)
}

#[instrument(skip(gateway))]
pub async fn fetch_user_by_id<G: Gateway>(gateway: &G, id: Uuid) -> Result<UserRow, DbError> {
    debug!("Looking up user");
    let user = gateway
        .query_user_by_id(id)
        .await
        .inspect_err(|e| error!("Failed to fetch user: {e}"))?
        .ok_or(DbError::NotFound)
        .inspect_err(|_| warn!("User not found"))?;
    debug!(email = %user.email, "User found");
    Ok(user)
}

#[instrument(skip(gateway))]
pub async fn fetch_user_by_email<G: Gateway>(gateway: &G, email: &str) -> Result<UserRow, DbError> {
    debug!("Looking up user");
    let user = gateway
        .query_user_by_email(email)
        .await
        .inspect_err(|e| error!("Failed to fetch user: {e}"))?
        .ok_or(DbError::NotFound)
        .inspect_err(|_| warn!("User not found"))?;
    debug!(id = %user.id, "User found");
    Ok(user)
}

/// Insert a new user with server-assigned timestamps.
///
/// No validation happens here; empty fields and duplicate emails are left to
/// the store's constraints.
#[instrument(skip(gateway, password))]
pub async fn create_user<G: Gateway>(
    gateway: &G,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), DbError> {
    info!("Creating user");
    let user = NewUser {
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    };
    gateway
        .exec_insert_user(&user)
        .await
        .inspect_err(|e| error!("Failed to create user: {e}"))?;
    info!("User created");
    Ok(())
}
