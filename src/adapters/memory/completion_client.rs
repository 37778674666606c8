//! Mock completion client for tests.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    CompletionClient, CompletionError, CompletionRequest, CompletionStream, ModelInfo,
    ModelPricing,
};

/// Configurable completion client that replays scripted replies.
///
/// Replies are consumed in configuration order; a drained script fails
/// the call. Streaming replies are chunked into word fragments the way
/// a real provider delivers deltas.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionClient {
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    models: Arc<Mutex<Vec<ModelInfo>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[derive(Debug, Clone)]
enum ScriptedReply {
    Reply(String),
    Failure(CompletionError),
    /// Fragments delivered in order, then an error mid-stream.
    BrokenStream(Vec<String>, CompletionError),
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Reply(content.into()));
        self
    }

    /// Queues a request-time failure.
    pub fn with_failure(self, error: CompletionError) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Failure(error));
        self
    }

    /// Queues a stream that emits `fragments` then fails.
    pub fn with_broken_stream(
        self,
        fragments: Vec<impl Into<String>>,
        error: CompletionError,
    ) -> Self {
        let fragments = fragments.into_iter().map(Into::into).collect();
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::BrokenStream(fragments, error));
        self
    }

    /// Sets the model catalog returned by `list_models`.
    pub fn with_models(self, models: Vec<ModelInfo>) -> Self {
        *self.models.lock().unwrap() = models;
        self
    }

    /// Requests seen so far, for verification.
    pub fn captured_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> ScriptedReply {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Failure(CompletionError::network("script drained")))
    }

    fn record(&self, request: &CompletionRequest) {
        self.requests.lock().unwrap().push(request.clone());
    }
}

/// Splits a reply into word fragments, each keeping its trailing space.
fn word_fragments(text: &str) -> Vec<String> {
    text.split_inclusive(' ')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.record(&request);
        match self.next_reply() {
            ScriptedReply::Reply(content) => Ok(content),
            ScriptedReply::Failure(error) => Err(error),
            ScriptedReply::BrokenStream(_, error) => Err(error),
        }
    }

    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, CompletionError> {
        self.record(&request);
        match self.next_reply() {
            ScriptedReply::Reply(content) => {
                let fragments: Vec<Result<String, CompletionError>> =
                    word_fragments(&content).into_iter().map(Ok).collect();
                Ok(Box::pin(stream::iter(fragments)))
            }
            ScriptedReply::Failure(error) => Err(error),
            ScriptedReply::BrokenStream(fragments, error) => {
                let items: Vec<Result<String, CompletionError>> = fragments
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(error)))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        Ok(self.models.lock().unwrap().clone())
    }
}

/// A free model entry for test catalogs.
pub fn free_model(id: &str) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: id.to_string(),
        description: None,
        context_length: Some(8192),
        pricing: ModelPricing {
            prompt: "0".to_string(),
            completion: "0".to_string(),
        },
        supports_vision: false,
    }
}
