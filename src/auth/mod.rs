//! Authentication: credential verification, identity tokens, register/login handlers.

mod handlers;
mod jwt;
mod service;

pub use handlers::{current_user, login, register, LoginRequest, RegisterRequest, TokenResponse, UserInfo};
pub use jwt::{Claims, TokenIssuer};
pub use service::CredentialVerifier;
