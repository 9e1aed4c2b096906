//! Developer network REST backend: registration, login and token-guarded routes.
//!
//! Passwords are argon2-hashed; identity tokens are HS256 JWTs carried in the
//! `x-auth-token` header and checked by [`middleware::require_auth`].

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::http::AppState;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router (health, register/login, protected routes). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let protected = axum::Router::new()
        .route("/auth", get(auth::current_user))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let api = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/users", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected);

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
