//! HTTP handlers, one module per resource.

pub mod auth;
pub mod chat;
pub mod conversations;
pub mod health;
pub mod models;
