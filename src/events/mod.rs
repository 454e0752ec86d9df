//! Community events: models and store operations
//!
//! Events collect registrations up to an optional capacity. At most one
//! event is featured at a time, and events with registered participants are
//! locked against edits and deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::users;
use crate::error::{Error, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Active,
    Finished,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Upcoming => write!(f, "upcoming"),
            EventStatus::Active => write!(f, "active"),
            EventStatus::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub tag: String,
    pub description: String,
    pub image: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub rewards: Option<String>,
    pub is_featured: bool,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    /// Number of registered participants, counted per query.
    pub participant_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub tag: String,
    pub description: String,
    pub image: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub rewards: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub title: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub rewards: Option<String>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub created_at: DateTime<Utc>,
}

const EVENT_SELECT: &str = "SELECT e.id, e.title, e.tag, e.description, e.image,
        e.start_date, e.end_date, e.max_participants, e.rewards,
        e.is_featured, e.status, e.created_at,
        COUNT(r.id) AS participant_count
     FROM events e
     LEFT JOIN event_registrations r ON r.event_id = e.id";

/// All events with their registration counts, earliest start first.
pub async fn list(pool: &PgPool) -> Result<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT} GROUP BY e.id ORDER BY e.start_date ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT} WHERE e.id = $1 GROUP BY e.id"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Create an event. A featured event demotes whichever event was featured
/// before it, inside one transaction.
pub async fn create(pool: &PgPool, new: &NewEvent) -> Result<Event> {
    let mut tx = pool.begin().await?;

    if new.is_featured {
        sqlx::query("UPDATE events SET is_featured = false WHERE is_featured")
            .execute(&mut *tx)
            .await?;
    }

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO events
            (title, tag, description, image, start_date, end_date,
             max_participants, rewards, is_featured)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id",
    )
    .bind(&new.title)
    .bind(&new.tag)
    .bind(&new.description)
    .bind(&new.image)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.max_participants)
    .bind(&new.rewards)
    .bind(new.is_featured)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    // Freshly inserted, so the row is there
    get(pool, id)
        .await?
        .ok_or_else(|| Error::Other("Created event vanished".to_string()))
}

/// Apply a partial update. Fails when the event has registered participants.
pub async fn update(pool: &PgPool, id: i64, patch: &EventUpdate) -> Result<Event> {
    let event = get(pool, id).await?.ok_or(Error::NotFound("Event"))?;
    if event.participant_count > 0 {
        return Err(Error::Forbidden(
            "Cannot edit: users are already registered",
        ));
    }

    let mut tx = pool.begin().await?;

    if patch.is_featured == Some(true) {
        sqlx::query("UPDATE events SET is_featured = false WHERE is_featured AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        "UPDATE events SET
            title = COALESCE($2, title),
            tag = COALESCE($3, tag),
            description = COALESCE($4, description),
            image = COALESCE($5, image),
            start_date = COALESCE($6, start_date),
            end_date = COALESCE($7, end_date),
            max_participants = COALESCE($8, max_participants),
            rewards = COALESCE($9, rewards),
            is_featured = COALESCE($10, is_featured)
         WHERE id = $1",
    )
    .bind(id)
    .bind(&patch.title)
    .bind(&patch.tag)
    .bind(&patch.description)
    .bind(&patch.image)
    .bind(patch.start_date)
    .bind(patch.end_date)
    .bind(patch.max_participants)
    .bind(&patch.rewards)
    .bind(patch.is_featured)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get(pool, id)
        .await?
        .ok_or(Error::NotFound("Event"))
}

/// Delete an event. Fails when the event has registered participants.
pub async fn delete(pool: &PgPool, id: i64) -> Result<()> {
    let event = get(pool, id).await?.ok_or(Error::NotFound("Event"))?;
    if event.participant_count > 0 {
        return Err(Error::Forbidden(
            "Cannot delete: users are already registered",
        ));
    }

    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Register a user for an event.
///
/// Only active events accept registrations, and capacity is checked against
/// the current count. The duplicate-registration race resolves through the
/// unique (user_id, event_id) constraint, not application logic.
pub async fn join(pool: &PgPool, event_id: i64, user_id: i64) -> Result<Registration> {
    let event = match get(pool, event_id).await? {
        Some(event) if event.status == EventStatus::Active => event,
        _ => {
            return Err(Error::Validation(
                "Event is not open for registration".to_string(),
            ))
        }
    };

    if let Some(max) = event.max_participants {
        if event.participant_count >= max as i64 {
            return Err(Error::Validation("Event is full".to_string()));
        }
    }

    let registration = sqlx::query_as::<_, Registration>(
        "INSERT INTO event_registrations (user_id, event_id)
         VALUES ($1, $2)
         RETURNING id, user_id, event_id, created_at",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if users::is_unique_violation(&e) {
            Error::Validation("Already registered for this event".to_string())
        } else {
            Error::Database(e)
        }
    })?;

    Ok(registration)
}

/// Force an event's status, bypassing any scheduling.
pub async fn force_status(pool: &PgPool, id: i64, status: EventStatus) -> Result<Event> {
    let result = sqlx::query("UPDATE events SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Event"));
    }

    get(pool, id)
        .await?
        .ok_or(Error::NotFound("Event"))
}
