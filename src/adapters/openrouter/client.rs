//! OpenRouter client - Implementation of CompletionClient.
//!
//! Talks the OpenAI-compatible dialect: `POST /chat/completions` for both
//! blocking and streaming turns, `GET /models` for the catalog. Streaming
//! responses arrive as SSE `data:` lines which may be split across
//! transport chunks, so lines are reassembled before parsing.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenRouterConfig::new(api_key)
//!     .with_base_url("https://openrouter.ai/api/v1")
//!     .with_default_model("meta-llama/llama-3.2-3b-instruct:free");
//!
//! let client = OpenRouterClient::new(config);
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    CompletionClient, CompletionError, CompletionRequest, CompletionStream, ModelInfo,
    ModelPricing, IMAGE_DATA_URI_PREFIX,
};

/// Configuration for the OpenRouter client.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API.
    pub base_url: String,
    /// Model used when a request names none.
    pub default_model: String,
    /// Sent as `HTTP-Referer`; OpenRouter uses it for app attribution.
    pub referer: String,
    /// Sent as `X-Title`; shown in OpenRouter's dashboard.
    pub title: String,
    /// Timeout for non-streaming requests. Streaming responses run
    /// without one so long completions are never cut off mid-stream.
    pub timeout: Duration,
}

impl OpenRouterConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            default_model: "meta-llama/llama-3.2-3b-instruct:free".to_string(),
            referer: "http://localhost:8080".to_string(),
            title: "Chat Application".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Sets the attribution referer header value.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    /// Sets the attribution title header value.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the non-streaming request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenRouter API client.
pub struct OpenRouterClient {
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterClient {
    /// Creates a new OpenRouter client with the given configuration.
    pub fn new(config: OpenRouterConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Builds the model catalog endpoint URL.
    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url)
    }

    /// Converts a request to the wire format.
    ///
    /// History turns are plain text. The current turn is plain text too
    /// unless an image is attached, in which case it becomes a two-part
    /// array of a text part and a data-URI image part.
    fn to_wire_request(&self, request: &CompletionRequest, stream: bool) -> WireRequest {
        let mut messages = Vec::new();

        for msg in &request.history {
            messages.push(WireMessage {
                role: msg.role.as_str().to_string(),
                content: WireContent::Text(msg.content.clone()),
            });
        }

        let content = match &request.image {
            Some(image) => WireContent::Parts(vec![
                ContentPart::Text {
                    text: request.message.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("{}{}", IMAGE_DATA_URI_PREFIX, image),
                    },
                },
            ]),
            None => WireContent::Text(request.message.clone()),
        };
        messages.push(WireMessage {
            role: "user".to_string(),
            content,
        });

        WireRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.default_model.clone()),
            messages,
            stream: if stream { Some(true) } else { None },
        }
    }

    /// Sends a completion request, optionally as a stream.
    async fn send_request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<Response, CompletionError> {
        let wire_request = self.to_wire_request(request, stream);

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&wire_request);

        if !stream {
            builder = builder.timeout(self.config.timeout);
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::network(format!(
                    "Request timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            } else if e.is_connect() {
                CompletionError::network(format!("Connection failed: {}", e))
            } else {
                CompletionError::network(e.to_string())
            }
        })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(
        response: Response,
        endpoint: &str,
    ) -> Result<Response, CompletionError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(&body).unwrap_or_else(|| {
            let reason = status.canonical_reason().unwrap_or("request failed");
            if body.trim().is_empty() {
                reason.to_string()
            } else {
                format!("{}: {}", reason, body.trim())
            }
        });

        Err(CompletionError::upstream(status.as_u16(), message, endpoint))
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let response = self.send_request(&request, false).await?;
        let response = Self::handle_response_status(response, "/chat/completions").await?;

        let completion: WireCompletion = response
            .json()
            .await
            .map_err(|e| CompletionError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::parse("No choices in response"))?;

        Ok(choice.message.content)
    }

    async fn stream(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, CompletionError> {
        let response = self.send_request(&request, true).await?;
        let response = Self::handle_response_status(response, "/chat/completions").await?;

        // Reassemble SSE lines across transport chunks before parsing:
        // a `data:` line may arrive split over two reads.
        let stream = response
            .bytes_stream()
            .map(|chunk_result| {
                chunk_result.map_err(|e| CompletionError::network(format!("Stream error: {}", e)))
            })
            .scan(String::new(), |buffer, chunk_result| {
                let fragments: Vec<Result<String, CompletionError>> = match chunk_result {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        let mut out = Vec::new();
                        while let Some(pos) = buffer.find('\n') {
                            let line = buffer[..pos].trim_end_matches('\r').to_string();
                            buffer.drain(..=pos);
                            out.extend(parse_sse_line(&line).map(Ok));
                        }
                        out
                    }
                    Err(e) => vec![Err(e)],
                };
                futures::future::ready(Some(fragments))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        let response = self
            .client
            .get(self.models_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| CompletionError::network(e.to_string()))?;

        let response = Self::handle_response_status(response, "/models").await?;

        let list: WireModelList = response
            .json()
            .await
            .map_err(|e| CompletionError::parse(format!("Failed to parse model list: {}", e)))?;

        Ok(list.data.into_iter().map(wire_model_to_info).collect())
    }
}

/// Parses one SSE line into a content fragment.
///
/// Returns `None` for keep-alives, the `[DONE]` marker, frames without
/// content, and frames that fail to parse. Parse failures are logged and
/// skipped so one malformed frame never ends the stream.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data: ")?;

    if data == "[DONE]" {
        return None;
    }

    let chunk: WireStreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping unparseable SSE frame");
            return None;
        }
    };

    let content = chunk.choices.into_iter().next()?.delta.content?;
    if content.is_empty() {
        return None;
    }

    Some(content)
}

/// Extracts the provider's error message from an error body.
fn parse_error_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

fn wire_model_to_info(model: WireModel) -> ModelInfo {
    let supports_vision = model
        .architecture
        .input_modalities
        .iter()
        .any(|m| m == "image");

    ModelInfo {
        id: model.id,
        name: model.name,
        description: model.description,
        context_length: model.context_length,
        pricing: model.pricing,
        supports_vision,
    }
}

// ----- OpenRouter API Types -----

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: WireContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct WireCompletion {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct WireCompletionMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    choices: Vec<WireStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    delta: WireStreamDelta,
}

#[derive(Debug, Deserialize)]
struct WireStreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireModelList {
    data: Vec<WireModel>,
}

#[derive(Debug, Deserialize)]
struct WireModel {
    id: String,
    name: String,
    description: Option<String>,
    context_length: Option<u64>,
    #[serde(default)]
    pricing: ModelPricing,
    #[serde(default)]
    architecture: WireArchitecture,
}

#[derive(Debug, Default, Deserialize)]
struct WireArchitecture {
    #[serde(default)]
    input_modalities: Vec<String>,
}
