//! Shared application state and the health probe.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::TokenIssuer;
use crate::db::AccountStore;

/// Shared application state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: TokenIssuer) -> Self {
        Self { accounts, tokens }
    }
    pub fn accounts(&self) -> &dyn AccountStore {
        self.accounts.as_ref()
    }
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "devlink-auth" })),
    )
}
