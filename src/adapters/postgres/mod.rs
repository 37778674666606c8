//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! - `PgConversationStore` - conversations and their messages
//! - `PgUserStore` - registered accounts

mod conversation_store;
mod user_store;

pub use conversation_store::PgConversationStore;
pub use user_store::PgUserStore;
