//! Request guards and extractors shared by the HTTP handlers.

pub mod auth;
pub mod validation;

pub use auth::{require_auth, AuthUser, XAuthToken};
pub use validation::{lenient_string, ValidatedJson};
