//! Credential verification: argon2 hashing and email/password authentication.

use std::sync::OnceLock;

use crate::db::AccountStore;
use crate::error::{AppError, AppResult};
use crate::models::{normalize_email, Account};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::debug;

/// Hash checked on unknown emails so both failure paths pay for one argon2 verify.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

pub struct CredentialVerifier;

impl CredentialVerifier {
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
            .to_string();
        Ok(hash)
    }

    pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Resolve an email/password pair to its account.
    ///
    /// Unknown email and wrong password both yield `AppError::InvalidCredentials`.
    pub async fn authenticate(
        store: &dyn AccountStore,
        email: &str,
        password: &str,
    ) -> AppResult<Account> {
        let account = store.find_by_email(&normalize_email(email)).await?;

        let Some(account) = account else {
            if let Some(dummy) = DUMMY_HASH
                .get_or_init(|| Self::hash_password("devlink-dummy-password").ok())
                .as_deref()
            {
                let _ = Self::verify_password(password, dummy);
            }
            debug!("login rejected");
            return Err(AppError::InvalidCredentials);
        };

        if !Self::verify_password(password, &account.password_hash)? {
            debug!("login rejected");
            return Err(AppError::InvalidCredentials);
        }

        Ok(account)
    }
}
