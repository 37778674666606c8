//! Application layer - services and stream orchestration.
//!
//! This layer orchestrates domain operations over the ports. Each service
//! owns one slice of the API surface: `auth` for accounts and sessions,
//! `chat` for relaying turns to the completion provider, `models` for the
//! upstream catalog.

pub mod auth;
pub mod chat;
pub mod errors;
pub mod models;
