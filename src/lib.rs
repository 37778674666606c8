//! Chat Relay - Streaming chat backend.
//!
//! Relays chat turns to an LLM completion API (OpenRouter), persists
//! conversations, streams partial responses to clients over SSE, and
//! rate-limits per user with a sliding window.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
