//! OpenRouter adapter - upstream completion API client.

mod client;

pub use client::{OpenRouterClient, OpenRouterConfig};
