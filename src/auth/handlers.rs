//! Auth HTTP handlers: register, login, current user.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::CredentialVerifier;
use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;
use crate::middleware::{lenient_string, AuthUser, ValidatedJson};
use crate::models::{normalize_email, Account, NewAccount};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[validate(email(message = "Please include a valid email"))]
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Please include a valid email"))]
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl From<Account> for UserInfo {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name,
            email: account.email,
            avatar: account.avatar,
        }
    }
}

/// POST /api/register (also mounted at POST /api/users)
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    if body.name.trim().is_empty() {
        return Err(AppError::field("name", "Name is required"));
    }

    let email = normalize_email(&body.email);
    if state.accounts().find_by_email(&email).await?.is_some() {
        return Err(AppError::field("email", "User already exists"));
    }

    let password_hash = CredentialVerifier::hash_password(&body.password)?;
    let account = state
        .accounts()
        .insert(NewAccount::new(&body.name, &email, password_hash))
        .await?;
    let token = state.tokens().issue(account.id)?;
    info!(user_id = %account.id, "account registered");

    Ok(Json(TokenResponse {
        token,
        user: account.into(),
    }))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let account =
        CredentialVerifier::authenticate(state.accounts(), &body.email, &body.password).await?;
    let token = state.tokens().issue(account.id)?;
    info!(user_id = %account.id, "login succeeded");

    Ok(Json(TokenResponse {
        token,
        user: account.into(),
    }))
}

/// GET /api/auth — the authenticated account, without its password hash.
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Account>> {
    let account = state
        .accounts()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(account))
}
