//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `conversation` - Conversation and Message entities with the title rule
//! - `history` - Ordered role/content projection fed to the completion API
//! - `user` - Registered user entity and credentials

pub mod conversation;
pub mod foundation;
pub mod history;
pub mod user;
