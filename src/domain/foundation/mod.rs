//! Shared primitives the rest of the domain is written in terms of:
//! identifier newtypes, the UTC timestamp, caller identity, and the
//! error vocabulary.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::AuthenticatedUser;
pub use errors::{ChatError, ValidationError};
pub use ids::{ConversationId, MessageId, UserId};
pub use timestamp::Timestamp;
