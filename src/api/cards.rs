//! Card catalog handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::cards::{self, Card, CardUpdate, NewCard};
use crate::error::{Error, Result};

use super::server::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

/// GET /api/cards - active catalog, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Card>>> {
    Ok(Json(cards::list_active(&state.db).await?))
}

/// GET /api/cards/trash - soft-deleted cards (admin)
pub async fn list_trashed(State(state): State<AppState>) -> Result<Json<Vec<Card>>> {
    Ok(Json(cards::list_trashed(&state.db).await?))
}

/// GET /api/cards/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Card>> {
    let card = cards::get(&state.db, id)
        .await?
        .ok_or(Error::NotFound("Card"))?;
    Ok(Json(card))
}

/// POST /api/cards (admin)
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewCard>,
) -> Result<impl IntoResponse> {
    let card = cards::create(&state.db, &new).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// PUT /api/cards/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CardUpdate>,
) -> Result<Json<Card>> {
    let card = cards::update(&state.db, id, &patch)
        .await?
        .ok_or(Error::NotFound("Card"))?;
    Ok(Json(card))
}

/// DELETE /api/cards/{id} (admin) - soft delete into the trash
pub async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    if !cards::set_active(&state.db, id, false).await? {
        return Err(Error::NotFound("Card"));
    }
    Ok(message("Card moved to trash"))
}

/// PATCH /api/cards/{id}/restore (admin)
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    if !cards::set_active(&state.db, id, true).await? {
        return Err(Error::NotFound("Card"));
    }
    Ok(message("Card restored successfully"))
}

/// DELETE /api/cards/{id}/permanent (admin) - remove the row for good
pub async fn hard_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    if !cards::delete_permanent(&state.db, id).await? {
        return Err(Error::NotFound("Card"));
    }
    Ok(message("Card permanently deleted"))
}
