//! Event handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AccessClaims;
use crate::error::Result;
use crate::events::{self, Event, EventStatus, EventUpdate, NewEvent, Registration};

use super::server::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ForceStatusRequest {
    pub status: EventStatus,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub message: String,
    pub registration: Registration,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub event: Event,
}

/// GET /api/events - all events with participant counts, by start date
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Event>>> {
    Ok(Json(events::list(&state.db).await?))
}

/// POST /api/events (admin)
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewEvent>,
) -> Result<impl IntoResponse> {
    let event = events::create(&state.db, &new).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/{id} (admin) - rejected once participants are registered
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<EventUpdate>,
) -> Result<Json<Event>> {
    Ok(Json(events::update(&state.db, id, &patch).await?))
}

/// DELETE /api/events/{id} (admin) - rejected once participants are registered
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    events::delete(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// POST /api/events/{id}/join - any authenticated user; the user id comes
/// from the verified token, never from the body
pub async fn join(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registration = events::join(&state.db, id, claims.id).await?;

    tracing::info!(event_id = id, user_id = claims.id, "event registration");

    Ok((
        StatusCode::CREATED,
        Json(JoinResponse {
            message: "Registration successful".to_string(),
            registration,
        }),
    ))
}

/// PATCH /api/events/{id}/status (admin) - force an event's status
pub async fn force_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ForceStatusRequest>,
) -> Result<Json<StatusResponse>> {
    let event = events::force_status(&state.db, id, req.status).await?;

    Ok(Json(StatusResponse {
        message: format!("Status updated to {}", req.status),
        event,
    }))
}
