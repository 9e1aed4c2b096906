//! Integration tests: health, register/login, the token guard on protected routes.
//!
//! Run with `cargo test`. The in-memory account store is used by default; the
//! Postgres round trip runs only when `TEST_DATABASE_URL` is set.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use chrono::{Duration, Utc};
use devlink_auth::auth::TokenIssuer;
use devlink_auth::db::{self, MemoryAccountStore, PgAccountStore};
use devlink_auth::middleware::require_auth;
use devlink_auth::{create_app, AppState};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-jwt-secret-min-32-chars!!";

fn tokens() -> TokenIssuer {
    TokenIssuer::new(SECRET, std::time::Duration::from_secs(36_000)).unwrap()
}

fn memory_app() -> Router {
    create_app(AppState::new(Arc::new(MemoryAccountStore::new()), tokens()))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn get_me(app: &Router, token: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().uri("/api/auth");
    if let Some(token) = token {
        req = req.header("x-auth-token", token);
    }
    send(app, req.body(Body::empty()).unwrap()).await
}

fn token_of(json: &Value) -> String {
    json.get("token")
        .and_then(|v| v.as_str())
        .expect("response should contain token")
        .to_string()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = memory_app();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn register_login_and_access_protected_route() {
    let app = memory_app();

    let (status, registered) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Ada", "email": "a@x.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register should succeed");
    let user_id = registered["user"]["id"].as_str().unwrap().to_string();
    assert!(registered["user"]["avatar"]
        .as_str()
        .unwrap()
        .starts_with("https://www.gravatar.com/avatar/"));
    assert!(registered["user"].get("password_hash").is_none());

    let (status, json) = post_json(
        &app,
        "/api/login",
        json!({ "email": "a@x.com", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({ "error": "Invalid credentials" }));

    let (status, logged_in) = post_json(
        &app,
        "/api/login",
        json!({ "email": "a@x.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login should succeed");
    let token = token_of(&logged_in);
    assert_eq!(logged_in["user"]["id"], user_id.as_str());

    let (status, me) = get_me(&app, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["email"], "a@x.com");
    assert!(me.get("password_hash").is_none());

    let (status, json) = get_me(&app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({ "error": "No token, authorization denied" }));
}

#[tokio::test]
async fn registration_token_is_usable() {
    let app = memory_app();
    let (status, json) = post_json(
        &app,
        "/api/users",
        json!({ "name": "Bob", "email": "bob@x.com", "password": "hunter22" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, me) = get_me(&app, Some(&token_of(&json))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Bob");
}

#[tokio::test]
async fn unknown_email_and_wrong_password_share_error_shape() {
    let app = memory_app();
    post_json(
        &app,
        "/api/register",
        json!({ "name": "Ada", "email": "a@x.com", "password": "secret1" }),
    )
    .await;

    let wrong = post_json(
        &app,
        "/api/login",
        json!({ "email": "a@x.com", "password": "nope-nope" }),
    )
    .await;
    let unknown = post_json(
        &app,
        "/api/login",
        json!({ "email": "ghost@x.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn invalid_and_expired_tokens_are_rejected() {
    let app = memory_app();
    let (_, json) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Ada", "email": "a@x.com", "password": "secret1" }),
    )
    .await;
    let user_id: Uuid = json["user"]["id"].as_str().unwrap().parse().unwrap();

    let expired = tokens()
        .issue_at(user_id, Utc::now() - Duration::hours(11))
        .unwrap();
    let (status, body) = get_me(&app, Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token is not valid" }));

    let foreign = TokenIssuer::new("some-other-secret", std::time::Duration::from_secs(60))
        .unwrap()
        .issue(user_id)
        .unwrap();
    let (status, body) = get_me(&app, Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token is not valid" }));

    let (status, _) = get_me(&app, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = get_me(&app, Some("")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "No token, authorization denied" }));
}

#[tokio::test]
async fn tokens_resolve_to_their_own_account() {
    let app = memory_app();
    let (_, ada) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Ada", "email": "ada@x.com", "password": "secret1" }),
    )
    .await;
    let (_, bob) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Bob", "email": "bob@x.com", "password": "secret2" }),
    )
    .await;

    let (_, me_ada) = get_me(&app, Some(&token_of(&ada))).await;
    let (_, me_bob) = get_me(&app, Some(&token_of(&bob))).await;
    assert_eq!(me_ada["id"], ada["user"]["id"]);
    assert_eq!(me_bob["id"], bob["user"]["id"]);
    assert_ne!(me_ada["id"], me_bob["id"]);
}

#[tokio::test]
async fn token_for_deleted_account_is_not_found() {
    let app = memory_app();
    let token = tokens().issue(Uuid::new_v4()).unwrap();
    let (status, _) = get_me(&app, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_validation_errors_are_field_level() {
    let app = memory_app();
    let (status, json) = post_json(&app, "/api/register", json!({ "password": "123" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "errors": [
            { "field": "email", "msg": "Please include a valid email" },
            { "field": "name", "msg": "Name is required" },
            { "field": "password", "msg": "Please enter a password with 6 or more characters" },
        ]})
    );
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = memory_app();
    let body = json!({ "name": "Ada", "email": "a@x.com", "password": "secret1" });
    let (status, _) = post_json(&app, "/api/register", body.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Ada", "email": "A@X.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "errors": [{ "field": "email", "msg": "User already exists" }] })
    );
}

#[tokio::test]
async fn null_and_mistyped_fields_are_field_errors() {
    let app = memory_app();
    let (status, json) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Ada", "email": null, "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "errors": [{ "field": "email", "msg": "Please include a valid email" }] })
    );

    let (status, json) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Ada", "email": "a@x.com", "password": 123456 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "errors": [
            { "field": "password", "msg": "Please enter a password with 6 or more characters" }
        ]})
    );

    let (status, json) = post_json(
        &app,
        "/api/login",
        json!({ "email": ["a@x.com"], "password": false }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "errors": [
            { "field": "email", "msg": "Please include a valid email" },
            { "field": "password", "msg": "Password is required" },
        ]})
    );
}

#[tokio::test]
async fn body_without_content_type_is_still_validated() {
    let app = memory_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/login")
        .body(Body::from(json!({ "email": "a@x.com" }).to_string()))
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "errors": [{ "field": "password", "msg": "Password is required" }] })
    );

    let req = Request::builder()
        .method("POST")
        .uri("/api/register")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"].as_array().map(|e| e.len()), Some(3));
}

#[tokio::test]
async fn guard_halts_rejected_requests_before_the_handler() {
    let state = AppState::new(Arc::new(MemoryAccountStore::new()), tokens());
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new()
        .route(
            "/guarded",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "reached"
                }
            }),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let call = |token: Option<String>| {
        let app = app.clone();
        async move {
            let mut req = Request::builder().uri("/guarded");
            if let Some(token) = token {
                req = req.header("x-auth-token", token);
            }
            send(&app, req.body(Body::empty()).unwrap()).await.0
        }
    };

    let user = Uuid::new_v4();
    let expired = tokens()
        .issue_at(user, Utc::now() - Duration::hours(11))
        .unwrap();
    let foreign = TokenIssuer::new("some-other-secret", std::time::Duration::from_secs(60))
        .unwrap()
        .issue(user)
        .unwrap();

    assert_eq!(call(None).await, StatusCode::UNAUTHORIZED);
    assert_eq!(call(Some("garbage".into())).await, StatusCode::UNAUTHORIZED);
    assert_eq!(call(Some(expired)).await, StatusCode::UNAUTHORIZED);
    assert_eq!(call(Some(foreign)).await, StatusCode::UNAUTHORIZED);
    assert_eq!(hits.load(Ordering::SeqCst), 0, "handler ran for a rejected request");

    let valid = tokens().issue(user).unwrap();
    assert_eq!(call(Some(valid)).await, StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = memory_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn postgres_register_and_login() {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL");
            return;
        }
    };
    let pool = match db::create_pool(&database_url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skip integration test: {}", e);
            return;
        }
    };
    db::run_migrations(&pool).await.unwrap();
    let app = create_app(AppState::new(Arc::new(PgAccountStore::new(pool)), tokens()));

    let email = format!("test-{}@example.com", Uuid::new_v4().simple());
    let (status, _) = post_json(
        &app,
        "/api/register",
        json!({ "name": "Pg", "email": email, "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register should succeed");

    let (status, json) = post_json(
        &app,
        "/api/login",
        json!({ "email": email, "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login should succeed");
    let (status, me) = get_me(&app, Some(&token_of(&json))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], email.as_str());
}
