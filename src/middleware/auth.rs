//! Token guard: `x-auth-token` header, `require_auth` middleware and the `AuthUser` extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{self, Header, HeaderMapExt};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::AppState;

static X_AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");

/// Typed `x-auth-token` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XAuthToken(pub String);

impl Header for XAuthToken {
    fn name() -> &'static HeaderName {
        &X_AUTH_TOKEN
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let token = value.to_str().map_err(|_| headers::Error::invalid())?;
        Ok(XAuthToken(token.trim().to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Authenticated user id, placed in request extensions by `require_auth`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::MissingToken)
    }
}

/// Middleware: reject unless `x-auth-token` carries a valid, unexpired token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match request.headers().typed_try_get::<XAuthToken>() {
        Ok(Some(XAuthToken(token))) if !token.is_empty() => token,
        Ok(_) => {
            debug!(path = %request.uri().path(), "rejected request: missing x-auth-token");
            return Err(AppError::MissingToken);
        }
        Err(_) => {
            debug!(path = %request.uri().path(), "rejected request: unreadable x-auth-token");
            return Err(AppError::InvalidToken);
        }
    };

    let user_id = state.tokens().verify(&token)?;
    request.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(request).await)
}
