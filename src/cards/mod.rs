//! Trading-card catalog: models and store operations
//!
//! Cards are soft-deleted into a "trash" (is_active = false) before an admin
//! decides to restore or permanently remove them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub element: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub description: String,
    pub power: i32,
    pub rarity: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub name: String,
    pub element: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub description: String,
    pub power: i32,
    pub rarity: String,
    pub image: Option<String>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub name: Option<String>,
    pub element: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub description: Option<String>,
    pub power: Option<i32>,
    pub rarity: Option<String>,
    pub image: Option<String>,
}

const CARD_COLUMNS: &str =
    "id, name, element, card_type, description, power, rarity, image, is_active, created_at";

/// Active catalog, newest first.
pub async fn list_active(pool: &PgPool) -> Result<Vec<Card>> {
    let cards = sqlx::query_as::<_, Card>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE is_active ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(cards)
}

/// Soft-deleted cards.
pub async fn list_trashed(pool: &PgPool) -> Result<Vec<Card>> {
    let cards = sqlx::query_as::<_, Card>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE NOT is_active"
    ))
    .fetch_all(pool)
    .await?;

    Ok(cards)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Card>> {
    let card = sqlx::query_as::<_, Card>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(card)
}

pub async fn create(pool: &PgPool, new: &NewCard) -> Result<Card> {
    let card = sqlx::query_as::<_, Card>(&format!(
        "INSERT INTO cards (name, element, card_type, description, power, rarity, image)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {CARD_COLUMNS}"
    ))
    .bind(&new.name)
    .bind(&new.element)
    .bind(&new.card_type)
    .bind(&new.description)
    .bind(new.power)
    .bind(&new.rarity)
    .bind(&new.image)
    .fetch_one(pool)
    .await?;

    Ok(card)
}

pub async fn update(pool: &PgPool, id: i64, patch: &CardUpdate) -> Result<Option<Card>> {
    let card = sqlx::query_as::<_, Card>(&format!(
        "UPDATE cards SET
            name = COALESCE($2, name),
            element = COALESCE($3, element),
            card_type = COALESCE($4, card_type),
            description = COALESCE($5, description),
            power = COALESCE($6, power),
            rarity = COALESCE($7, rarity),
            image = COALESCE($8, image)
         WHERE id = $1
         RETURNING {CARD_COLUMNS}"
    ))
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.element)
    .bind(&patch.card_type)
    .bind(&patch.description)
    .bind(patch.power)
    .bind(&patch.rarity)
    .bind(&patch.image)
    .fetch_optional(pool)
    .await?;

    Ok(card)
}

/// Flip the soft-delete flag. Returns false when no such card exists.
pub async fn set_active(pool: &PgPool, id: i64, active: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE cards SET is_active = $2 WHERE id = $1")
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove the row for good.
pub async fn delete_permanent(pool: &PgPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM cards WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
