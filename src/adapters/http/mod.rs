//! HTTP adapter - the REST and SSE surface.
//!
//! Handlers are thin: they translate between wire DTOs and the
//! application services, which hold all the behavior.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::app_router;
pub use state::AppState;
