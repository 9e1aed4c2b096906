//! JSON body extractor that runs `validator` rules before the handler sees the body.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use validator::Validate;

use crate::error::AppError;

/// Like `Json<T>`, but rule violations are 400 field-level `Validation` errors.
///
/// The content type is not checked and an empty body reads as `{}`, so an
/// absent or mislabelled body still yields per-field messages. Only
/// unparsable JSON is a plain 400 `BadRequest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &body
        };
        let value: T = serde_json::from_slice(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Reads any JSON value into a `String`: strings pass through, everything
/// else (`null`, numbers, objects...) becomes empty so validation rules fire.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}
