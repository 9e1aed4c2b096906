//! Identity token issue and verification (HS256 JWT).

use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies identity tokens with the process signing secret.
///
/// Built once at startup and shared read-only by the login/register handlers
/// and the `require_auth` guard.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: std::time::Duration) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::Internal(anyhow::anyhow!("empty signing secret")));
        }
        let ttl = Duration::from_std(ttl)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token ttl: {}", e)))?;
        // reject lifetimes whose expiry cannot be represented, so issue never fails per request
        if Utc::now().checked_add_signed(ttl).is_none() {
            return Err(AppError::Internal(anyhow::anyhow!("token ttl too large")));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if minted at `now`.
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<String> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("token expiry overflow")))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("sign token: {}", e)))
    }

    /// Resolve a token to its user id. Every failure is the same `InvalidToken`.
    pub fn verify(&self, token: &str) -> AppResult<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            AppError::InvalidToken
        })?;
        // exp must be strictly in the future
        if data.claims.exp <= Utc::now().timestamp() {
            debug!("token rejected: expired");
            return Err(AppError::InvalidToken);
        }
        Uuid::parse_str(&data.claims.sub).map_err(|_| {
            debug!("token rejected: subject is not a user id");
            AppError::InvalidToken
        })
    }
}
