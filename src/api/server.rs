//! HTTP API server

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{require_admin, require_auth, TokenIssuer};
use crate::config::{Config, CorsConfig};
use crate::db;
use crate::error::Result;

use super::{auth, cards, events};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: sqlx::PgPool,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(config: Config, db: sqlx::PgPool) -> Self {
        let tokens = TokenIssuer::new(&config.auth);
        Self {
            config: Arc::new(config),
            db,
            tokens,
        }
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(config, pool);
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match db::health_check(&state.db).await {
        Ok(()) => Json(serde_json::json!({"status": "healthy"})),
        Err(_) => Json(serde_json::json!({"status": "degraded"})),
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    // Open routes: reads plus the auth endpoints themselves
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", get(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/cards", get(cards::list))
        .route("/api/cards/{id}", get(cards::get_by_id))
        .route("/api/events", get(events::list));

    // Any authenticated user
    let user_routes = Router::new()
        .route("/api/events/{id}/join", post(events::join))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    // Admin only; require_auth runs first (outermost), then the role gate
    let admin_routes = Router::new()
        .route("/api/cards/trash", get(cards::list_trashed))
        .route("/api/cards", post(cards::create))
        .route("/api/cards/{id}", put(cards::update).delete(cards::soft_delete))
        .route("/api/cards/{id}/restore", patch(cards::restore))
        .route("/api/cards/{id}/permanent", delete(cards::hard_delete))
        .route("/api/events", post(events::create))
        .route("/api/events/{id}", put(events::update).delete(events::delete))
        .route("/api/events/{id}/status", patch(events::force_status))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
