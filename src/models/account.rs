//! Account record owned by the account store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar";

/// A registered user. `password_hash` never leaves the server.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub password_hash: String,
}

impl NewAccount {
    /// Builds the insert payload, normalizing the email and deriving the avatar from it.
    pub fn new(name: &str, email: &str, password_hash: String) -> Self {
        let email = normalize_email(email);
        Self {
            name: name.trim().to_string(),
            avatar: avatar_url(&email),
            email,
            password_hash,
        }
    }
}

/// Emails are unique keys; compare them trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Gravatar URL (SHA-256 address hash, 200px, PG rating, mystery-person fallback).
pub fn avatar_url(email: &str) -> String {
    let digest = Sha256::digest(normalize_email(email).as_bytes());
    format!("{}/{}?s=200&r=pg&d=mm", GRAVATAR_BASE, hex::encode(digest))
}
