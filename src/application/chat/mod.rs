//! Chat turn orchestration: synchronous sends and streaming sessions.

mod events;
mod history;
mod mode;
mod service;
mod synthetic;

pub use events::StreamEvent;
pub use history::HistoryBuilder;
pub use mode::{RequestMode, TEST_MESSAGE_PREFIX};
pub use service::{ChatCommand, ChatService, SendResult};
