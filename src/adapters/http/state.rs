//! Shared handler state.

use std::sync::Arc;

use crate::application::auth::AuthService;
use crate::application::chat::ChatService;
use crate::application::models::ModelCatalogService;
use crate::ports::ConversationStore;

/// State shared by all HTTP handlers.
///
/// Services are cheap to clone; the stores behind them are shared.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub auth: AuthService,
    pub catalog: Arc<ModelCatalogService>,
    pub conversations: Arc<dyn ConversationStore>,
}

impl AppState {
    pub fn new(
        chat: ChatService,
        auth: AuthService,
        catalog: Arc<ModelCatalogService>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            chat,
            auth,
            catalog,
            conversations,
        }
    }
}
