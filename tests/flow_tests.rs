//! End-to-end flows against a real PostgreSQL instance.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cardforge::api::{create_router, AppState};
use cardforge::auth::{password, TokenIssuer};
use cardforge::config::Config;
use cardforge::db::{self, Role};

const ACCESS_SECRET: &str = "flow-test-access-secret";
const REFRESH_SECRET: &str = "flow-test-refresh-secret";

async fn test_state() -> AppState {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let mut config = Config::default();
    config.database.url = url;
    config.auth.access_secret = ACCESS_SECRET.to_string();
    config.auth.refresh_secret = REFRESH_SECRET.to_string();

    let pool = db::create_pool(&config.database).await.expect("pool");
    db::run_migrations(&pool).await.expect("migrations");

    AppState::new(config, pool)
}

fn unique_email(prefix: &str) -> String {
    format!(
        "{}-{}@example.com",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap()
    )
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::post(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::post(uri)
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Register + login a user, returning (user_id, access_token, refresh_cookie).
async fn signup_and_login(app: &Router, email: &str) -> (i64, String, String) {
    let response = post_json(
        app,
        "/api/auth/register",
        json!({
            "MCName": "FlowPlayer",
            "DCName": "Flow#0001",
            "email": email,
            "password": "password123"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let user_id = body["userId"].as_i64().unwrap();

    let response = post_json(
        app,
        "/api/auth/login",
        json!({"email": email, "password": "password123"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("login must set the refresh cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let body = body_json(response).await;
    let token = body["accessToken"].as_str().unwrap().to_string();

    (user_id, token, cookie)
}

#[tokio::test]
#[ignore = "requires running PostgreSQL database"]
async fn register_login_refresh_scenario() {
    let state = test_state().await;
    let pool = state.db.clone();
    let issuer = TokenIssuer::new(&state.config.auth);
    let app = create_router(state);

    let email = unique_email("auth-flow");

    // Registration succeeds once
    let (user_id, access_token, refresh_cookie) = signup_and_login(&app, &email).await;

    // ... and only once: the duplicate creates no second row
    let response = post_json(
        &app,
        "/api/auth/register",
        json!({
            "MCName": "Copycat",
            "DCName": "Copy#0002",
            "email": email,
            "password": "otherpassword"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Email already in use");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // Wrong password and unknown email are indistinguishable
    let wrong_pw = post_json(
        &app,
        "/api/auth/login",
        json!({"email": email, "password": "wrong"}),
    )
    .await;
    let unknown = post_json(
        &app,
        "/api/auth/login",
        json!({"email": unique_email("ghost"), "password": "password123"}),
    )
    .await;
    assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(wrong_pw).await["message"],
        body_json(unknown).await["message"]
    );

    // The login token verifies against the access secret with {id, role}
    let claims = issuer.verify_access(&access_token).unwrap();
    assert_eq!(claims.id, user_id);
    assert_eq!(claims.role, Role::Standard);

    // Standard role cannot reach admin routes
    let response = post_json_auth(
        &app,
        "/api/cards",
        &access_token,
        json!({
            "name": "Ember Drake", "element": "fire", "type": "creature",
            "description": "A small drake", "power": 7, "rarity": "rare"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Refresh yields a fresh access token from the cookie alone
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/auth/refresh")
                .header(COOKIE, &refresh_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(issuer.verify_access(&refreshed).unwrap().role, Role::Standard);

    // Promote the user; the same old cookie must now yield an admin token,
    // because the role is re-read from the store on every refresh
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/auth/refresh")
                .header(COOKIE, &refresh_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let admin_token = body_json(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(issuer.verify_access(&admin_token).unwrap().role, Role::Admin);

    // The promoted token passes the admin gate
    let response = post_json_auth(
        &app,
        "/api/cards",
        &admin_token,
        json!({
            "name": "Ember Drake", "element": "fire", "type": "creature",
            "description": "A small drake", "power": 7, "rarity": "rare"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL database"]
async fn card_trash_and_restore_flow() {
    let state = test_state().await;
    let pool = state.db.clone();
    let issuer = TokenIssuer::new(&state.config.auth);
    let app = create_router(state);

    // Seed an admin directly; registration always yields the standard role
    let digest = password::hash("admin-password").unwrap();
    let (admin_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (mc_name, dc_name, email, password_hash, role)
         VALUES ('AdminMC', 'Admin#0001', $1, $2, 'admin') RETURNING id",
    )
    .bind(unique_email("card-admin"))
    .bind(&digest)
    .fetch_one(&pool)
    .await
    .unwrap();
    let token = issuer.issue_access(admin_id, Role::Admin).unwrap();

    let response = post_json_auth(
        &app,
        "/api/cards",
        &token,
        json!({
            "name": "Tide Caller", "element": "water", "type": "spell",
            "description": "Summons the tide", "power": 4, "rarity": "common"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let card_id = body_json(response).await["id"].as_i64().unwrap();

    // Soft delete hides it from the public catalog
    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/cards/{}", card_id))
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::get("/api/cards").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let catalog = body_json(response).await;
    assert!(catalog
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["id"].as_i64() != Some(card_id)));

    // ... but it shows up in the trash
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/cards/trash")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let trash = body_json(response).await;
    assert!(trash
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"].as_i64() == Some(card_id)));

    // Restore brings it back
    let response = app
        .clone()
        .oneshot(
            Request::patch(format!("/api/cards/{}/restore", card_id))
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/cards/{}", card_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isActive"], true);

    // Hard delete removes the row entirely
    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/cards/{}/permanent", card_id))
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/cards/{}", card_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL database"]
async fn event_registration_flow() {
    let state = test_state().await;
    let pool = state.db.clone();
    let issuer = TokenIssuer::new(&state.config.auth);
    let app = create_router(state);

    let digest = password::hash("admin-password").unwrap();
    let (admin_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (mc_name, dc_name, email, password_hash, role)
         VALUES ('EventAdmin', 'Admin#0002', $1, $2, 'admin') RETURNING id",
    )
    .bind(unique_email("event-admin"))
    .bind(&digest)
    .fetch_one(&pool)
    .await
    .unwrap();
    let admin_token = issuer.issue_access(admin_id, Role::Admin).unwrap();

    // Create an event with room for a single participant
    let response = post_json_auth(
        &app,
        "/api/events",
        &admin_token,
        json!({
            "title": "Draft Night",
            "tag": "draft",
            "description": "One seat only",
            "startDate": "2026-09-01T18:00:00Z",
            "endDate": "2026-09-01T22:00:00Z",
            "maxParticipants": 1
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let event = body_json(response).await;
    let event_id = event["id"].as_i64().unwrap();
    assert_eq!(event["status"], "upcoming");
    assert_eq!(event["participantCount"], 0);

    // Joining an upcoming event is rejected
    let (_, user_token, _) = signup_and_login(&app, &unique_email("joiner-a")).await;
    let response = post_json_auth(
        &app,
        &format!("/api/events/{}/join", event_id),
        &user_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Force it active, then the join goes through
    let response = app
        .clone()
        .oneshot(
            Request::patch(format!("/api/events/{}/status", event_id))
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::from(json!({"status": "active"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        &app,
        &format!("/api/events/{}/join", event_id),
        &user_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Joining twice is rejected
    let response = post_json_auth(
        &app,
        &format!("/api/events/{}/join", event_id),
        &user_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Capacity of one: a second user bounces off
    let (_, other_token, _) = signup_and_login(&app, &unique_email("joiner-b")).await;
    let response = post_json_auth(
        &app,
        &format!("/api/events/{}/join", event_id),
        &other_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Event is full");

    // With participants registered, edits and deletion are locked
    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/api/events/{}", event_id))
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::from(json!({"title": "Renamed"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/events/{}", event_id))
                .header(AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL database"]
async fn featured_event_is_exclusive() {
    let state = test_state().await;
    let pool = state.db.clone();
    let issuer = TokenIssuer::new(&state.config.auth);
    let app = create_router(state);

    let digest = password::hash("admin-password").unwrap();
    let (admin_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (mc_name, dc_name, email, password_hash, role)
         VALUES ('FeatAdmin', 'Admin#0003', $1, $2, 'admin') RETURNING id",
    )
    .bind(unique_email("feat-admin"))
    .bind(&digest)
    .fetch_one(&pool)
    .await
    .unwrap();
    let token = issuer.issue_access(admin_id, Role::Admin).unwrap();

    let mut ids = Vec::new();
    for title in ["First Feature", "Second Feature"] {
        let response = post_json_auth(
            &app,
            "/api/events",
            &token,
            json!({
                "title": title,
                "tag": "featured",
                "description": "Front page event",
                "startDate": "2026-10-01T18:00:00Z",
                "endDate": "2026-10-01T22:00:00Z",
                "isFeatured": true
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        ids.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let (featured_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM events WHERE is_featured AND id = ANY($1)",
    )
    .bind(&ids)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(featured_count, 1);

    let (still_featured,): (bool,) =
        sqlx::query_as("SELECT is_featured FROM events WHERE id = $1")
            .bind(ids[1])
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(still_featured);
}
