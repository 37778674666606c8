//! Chat session orchestration.
//!
//! `ChatService` owns the full lifecycle of a turn: resolve or create the
//! conversation, persist the user message, assemble history, invoke the
//! completion provider, persist the assistant reply, and maintain the
//! conversation title. The streaming variant relays provider fragments
//! through a bounded channel that the HTTP layer frames as SSE.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{
    ChatError, ConversationId, MessageId, UserId, ValidationError,
};
use crate::domain::history::HistoryMessage;
use crate::ports::{
    CompletionClient, CompletionError, CompletionRequest, ConversationStore,
    IMAGE_DATA_URI_PREFIX,
};

use super::events::StreamEvent;
use super::history::HistoryBuilder;
use super::mode::RequestMode;
use super::synthetic::{synthetic_fragments, WORD_DELAY_MS};

/// Events buffered between the session driver and the SSE writer.
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Client-facing text for unclassified mid-stream failures.
const GENERIC_STREAM_ERROR: &str = "An error occurred while streaming";

/// Client-facing text when the upstream failure looks like throttling.
const RATE_LIMIT_STREAM_ERROR: &str =
    "429 Too Many Requests: Rate limit exceeded. Please wait a moment and try again.";

/// One chat turn as requested by the caller.
#[derive(Debug, Clone)]
pub struct ChatCommand {
    /// The authenticated sender.
    pub user_id: UserId,
    /// Existing conversation to continue, or `None` to start a new one.
    pub conversation_id: Option<ConversationId>,
    /// The message text, verbatim from the client.
    pub message: String,
    /// Model override; the configured default applies when absent.
    pub model: Option<String>,
    /// Optional attached image as raw base64, without a data URI prefix.
    pub image: Option<String>,
}

impl ChatCommand {
    /// Creates a command for a new conversation with defaults.
    pub fn new(user_id: UserId, message: impl Into<String>) -> Self {
        Self {
            user_id,
            conversation_id: None,
            message: message.into(),
            model: None,
            image: None,
        }
    }

    /// Continues an existing conversation.
    pub fn with_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    /// Overrides the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attaches an image.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Result of a synchronous (non-streaming) turn.
#[derive(Debug, Clone)]
pub struct SendResult {
    /// The full assistant reply.
    pub content: String,
    /// The conversation the turn belongs to.
    pub conversation_id: ConversationId,
    /// The persisted assistant message.
    pub message_id: MessageId,
}

/// How a streaming session's emission phase ended.
enum SessionOutcome {
    /// All fragments emitted; carries the accumulated response.
    Finished(String),
    /// The receiver dropped mid-stream. The partial response is discarded.
    ClientGone,
    /// The provider failed; an `error` event was already emitted.
    Failed,
}

/// Orchestrates chat turns against the conversation store and the
/// completion provider.
#[derive(Clone)]
pub struct ChatService {
    conversations: Arc<dyn ConversationStore>,
    completions: Arc<dyn CompletionClient>,
    history: HistoryBuilder,
    default_model: String,
}

impl ChatService {
    /// Creates a service with the given dependencies.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        completions: Arc<dyn CompletionClient>,
        default_model: impl Into<String>,
    ) -> Self {
        let history = HistoryBuilder::new(Arc::clone(&conversations));
        Self {
            conversations,
            completions,
            history,
            default_model: default_model.into(),
        }
    }

    /// Runs one turn synchronously and returns the full assistant reply.
    ///
    /// Always calls the live provider; the synthetic test prefix is not
    /// interpreted here.
    pub async fn send(&self, cmd: ChatCommand) -> Result<SendResult, ChatError> {
        if cmd.message.trim().is_empty() {
            return Err(ValidationError::empty_field("message").into());
        }

        let mut conversation = self.resolve_conversation(&cmd).await?;
        let conversation_id = conversation.id();
        let model = self.resolve_model(&cmd);

        let user_message = self
            .persist_user_message(&cmd, conversation_id, &model)
            .await?;
        let history = self
            .history
            .build_excluding(&conversation_id, user_message.id())
            .await?;
        let history_len = history.len();

        let request = self.completion_request(&cmd, &model, history);
        let content = self.completions.complete(request).await?;

        let message_id = self
            .finalize(
                &mut conversation,
                history_len,
                &cmd.message,
                &content,
                &model,
            )
            .await?;

        Ok(SendResult {
            content,
            conversation_id,
            message_id,
        })
    }

    /// Starts a streaming session and returns its event receiver.
    ///
    /// Conversation resolution, user-message persistence, and the history
    /// build all happen before any event is produced, so their failures
    /// surface as request-level errors rather than in-stream ones. After
    /// that the session runs to completion in a background task; dropping
    /// the receiver stops it.
    pub async fn stream(
        &self,
        cmd: ChatCommand,
    ) -> Result<mpsc::Receiver<StreamEvent>, ChatError> {
        if cmd.message.trim().is_empty() {
            return Err(ValidationError::empty_field("message").into());
        }

        let conversation = self.resolve_conversation(&cmd).await?;
        let conversation_id = conversation.id();
        let model = self.resolve_model(&cmd);

        let user_message = self
            .persist_user_message(&cmd, conversation_id, &model)
            .await?;
        let history = self
            .history
            .build_excluding(&conversation_id, user_message.id())
            .await?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        let service = self.clone();
        tokio::spawn(async move {
            service.drive_session(conversation, cmd, model, history, tx).await;
        });

        Ok(rx)
    }

    /// Drives one streaming session end to end.
    async fn drive_session(
        &self,
        mut conversation: Conversation,
        cmd: ChatCommand,
        model: String,
        history: Vec<HistoryMessage>,
        tx: mpsc::Sender<StreamEvent>,
    ) {
        let conversation_id = conversation.id();
        if tx
            .send(StreamEvent::Init { conversation_id })
            .await
            .is_err()
        {
            return;
        }

        let mode = RequestMode::detect(&cmd.message);
        let history_len = history.len();

        let outcome = match &mode {
            RequestMode::Synthetic { text } => self.drive_synthetic(text, &tx).await,
            RequestMode::Live => self.drive_live(&cmd, &model, history, &tx).await,
        };

        let full_response = match outcome {
            SessionOutcome::Finished(content) => content,
            SessionOutcome::ClientGone => {
                tracing::debug!(%conversation_id, "Client disconnected mid-stream");
                return;
            }
            SessionOutcome::Failed => return,
        };

        match self
            .finalize(
                &mut conversation,
                history_len,
                mode.title_source(&cmd.message),
                &full_response,
                &model,
            )
            .await
        {
            Ok(message_id) => {
                let _ = tx
                    .send(StreamEvent::Complete {
                        message_id,
                        conversation_id,
                    })
                    .await;
            }
            Err(err) => {
                tracing::error!(error = %err, %conversation_id, "Failed to persist assistant message");
                let _ = tx.send(StreamEvent::error(GENERIC_STREAM_ERROR)).await;
            }
        }
    }

    /// Relays live provider fragments into the session channel.
    async fn drive_live(
        &self,
        cmd: &ChatCommand,
        model: &str,
        history: Vec<HistoryMessage>,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> SessionOutcome {
        let request = self.completion_request(cmd, model, history);

        let mut stream = match self.completions.stream(request).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "Completion stream failed to open");
                let _ = tx
                    .send(StreamEvent::error(sanitize_stream_error(&err)))
                    .await;
                return SessionOutcome::Failed;
            }
        };

        let mut full_response = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    full_response.push_str(&fragment);
                    if tx.send(StreamEvent::content(fragment)).await.is_err() {
                        return SessionOutcome::ClientGone;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Completion stream failed mid-response");
                    let _ = tx
                        .send(StreamEvent::error(sanitize_stream_error(&err)))
                        .await;
                    return SessionOutcome::Failed;
                }
            }
        }

        SessionOutcome::Finished(full_response)
    }

    /// Emits the canned response word by word with a fixed delay.
    async fn drive_synthetic(&self, text: &str, tx: &mpsc::Sender<StreamEvent>) -> SessionOutcome {
        let fragments = synthetic_fragments(text);
        let last = fragments.len().saturating_sub(1);

        let mut full_response = String::new();
        for (index, fragment) in fragments.into_iter().enumerate() {
            full_response.push_str(&fragment);
            if tx.send(StreamEvent::content(fragment)).await.is_err() {
                return SessionOutcome::ClientGone;
            }
            if index < last {
                tokio::time::sleep(Duration::from_millis(WORD_DELAY_MS)).await;
            }
        }

        SessionOutcome::Finished(full_response)
    }

    /// Loads the requested conversation or creates a fresh one.
    async fn resolve_conversation(&self, cmd: &ChatCommand) -> Result<Conversation, ChatError> {
        match cmd.conversation_id {
            Some(id) => self
                .conversations
                .find_for_user(&id, &cmd.user_id)
                .await?
                .ok_or_else(|| ChatError::not_found("Conversation")),
            None => {
                let conversation = Conversation::new(cmd.user_id);
                self.conversations.create(&conversation).await?;
                Ok(conversation)
            }
        }
    }

    fn resolve_model(&self, cmd: &ChatCommand) -> String {
        cmd.model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    /// Stores the user turn, image prefixed as a data URI.
    async fn persist_user_message(
        &self,
        cmd: &ChatCommand,
        conversation_id: ConversationId,
        model: &str,
    ) -> Result<Message, ChatError> {
        let mut message = Message::user(conversation_id, &cmd.message)?.with_model(model);
        if let Some(image) = &cmd.image {
            message = message.with_image(format!("{}{}", IMAGE_DATA_URI_PREFIX, image));
        }
        self.conversations.add_message(&message).await?;
        Ok(message)
    }

    fn completion_request(
        &self,
        cmd: &ChatCommand,
        model: &str,
        history: Vec<HistoryMessage>,
    ) -> CompletionRequest {
        let mut request = CompletionRequest::new(&cmd.message)
            .with_model(model)
            .with_history(history);
        if let Some(image) = &cmd.image {
            request = request.with_image(image);
        }
        request
    }

    /// Persists the assistant reply and settles the conversation title.
    ///
    /// The title is rewritten only while the conversation still carries the
    /// default title and the turn being finalized is its first exchange.
    async fn finalize(
        &self,
        conversation: &mut Conversation,
        history_len: usize,
        title_source: &str,
        content: &str,
        model: &str,
    ) -> Result<MessageId, ChatError> {
        let assistant = Message::assistant(conversation.id(), content, Some(model.to_string()));
        self.conversations.add_message(&assistant).await?;

        // The user turn and this reply are not part of the built history.
        let total_messages = history_len + 2;
        if conversation.should_adopt_title(total_messages) {
            conversation.rename(Conversation::derived_title(title_source));
        } else {
            conversation.touch();
        }
        self.conversations.update(conversation).await?;

        Ok(*assistant.id())
    }
}

/// Reduces a provider error to one of the two client-facing texts.
///
/// Anything mentioning 429, "rate limit", or "too many requests" is
/// reported as throttling; everything else gets the generic message so
/// provider internals never leak into the stream.
fn sanitize_stream_error(err: &CompletionError) -> &'static str {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if message.contains("429")
        || lowered.contains("rate limit")
        || lowered.contains("too many requests")
    {
        RATE_LIMIT_STREAM_ERROR
    } else {
        GENERIC_STREAM_ERROR
    }
}
