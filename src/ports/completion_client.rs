//! Completion Client Port - Interface to the upstream model provider.
//!
//! Abstracts the LLM completion API behind two calls: a blocking full
//! response and a streaming sequence of text fragments. Both build the same
//! request shape (history + current turn, with an optional image attached
//! as a data-URI content part). A catalog-listing call is also exposed.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::history::HistoryMessage;

/// Prefix turning a raw base64 image payload into its data-URI form.
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Lazy, finite, non-restartable sequence of completion text fragments.
pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send>>;

/// Port for the upstream completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a full completion in one call.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;

    /// Generate a streaming completion.
    ///
    /// Fragments arrive in publish order; the stream ends when the upstream
    /// closes it. Empty fragments are never emitted.
    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, CompletionError>;

    /// List the models the upstream currently offers.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError>;
}

/// Request for one completion, blocking or streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// The current user turn.
    pub message: String,
    /// Model identifier; the adapter falls back to its configured default
    /// when absent.
    pub model: Option<String>,
    /// Prior turns, ordered ascending by creation time.
    pub history: Vec<HistoryMessage>,
    /// Raw base64 image payload for the current turn, without data-URI
    /// prefix.
    pub image: Option<String>,
}

impl CompletionRequest {
    /// Creates a request for a bare message with no history.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: None,
            history: Vec::new(),
            image: None,
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attaches prior conversation turns.
    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.history = history;
        self
    }

    /// Attaches a raw base64 image payload.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// One entry in the upstream model catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Provider-scoped model identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Short description, if the provider supplies one.
    pub description: Option<String>,
    /// Context window size in tokens.
    pub context_length: Option<u64>,
    /// Per-token pricing, as decimal strings.
    pub pricing: ModelPricing,
    /// True if the model accepts image input.
    pub supports_vision: bool,
}

impl ModelInfo {
    /// Returns true if both prompt and completion pricing are zero.
    pub fn is_free(&self) -> bool {
        self.pricing.prompt == "0" && self.pricing.completion == "0"
    }
}

/// Pricing strings as the provider reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub prompt: String,
    pub completion: String,
}

/// Completion provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// Upstream returned an HTTP-level error.
    #[error("upstream error {status} from {endpoint}: {message}")]
    Upstream {
        /// HTTP status returned by the provider.
        status: u16,
        /// The provider's own error message.
        message: String,
        /// The endpoint the request targeted.
        endpoint: String,
    },

    /// Transport-level failure before or during the response.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to decode a provider response or stream frame.
    #[error("parse error: {0}")]
    Parse(String),
}

impl CompletionError {
    /// Creates an upstream error.
    pub fn upstream(status: u16, message: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
