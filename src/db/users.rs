//! User records and credential-store queries

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

use crate::error::Result;

/// User roles for authorization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    /// Regular community member
    #[default]
    Standard,
    /// Administrator - can manage the catalog and events
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Standard => write!(f, "standard"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// A registered user. The password hash never leaves this module's callers
/// except for verification; response projections are built separately.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub mc_name: String,
    pub dc_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, mc_name, dc_name, email, password_hash, role, created_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, mc_name, dc_name, email, password_hash, role, created_at
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Insert a new user with the default role. Returns the generated id.
///
/// The unique constraint on `email` is the authority for duplicate
/// registrations; callers map its violation to the same conflict response
/// as their pre-check.
pub async fn insert(
    pool: &PgPool,
    mc_name: &str,
    dc_name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (mc_name, dc_name, email, password_hash)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(mc_name)
    .bind(dc_name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// True when a database error is the unique-constraint violation raised by
/// a duplicate key.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
