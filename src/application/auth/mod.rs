//! Auth module - registration, login, and token verification.

mod jwt;
mod password;
mod service;

pub use jwt::{Claims, JwtCodec};
pub use service::{
    AuthService, AuthSession, LoginCommand, RegisterCommand, PASSWORD_MAX_CHARS,
    PASSWORD_MIN_CHARS,
};
