//! Detection of synthetic test sessions.

/// Messages starting with this prefix run against the synthetic generator
/// instead of the live completion provider.
pub const TEST_MESSAGE_PREFIX: &str = "/test ";

/// How a chat session sources its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMode {
    /// Forward the message to the completion provider.
    Live,
    /// Generate a canned response locally from the prefix remainder.
    Synthetic { text: String },
}

impl RequestMode {
    /// Classifies a message.
    ///
    /// The prefix match is exact, including the trailing space: `"/test"`
    /// alone is a live message.
    pub fn detect(message: &str) -> Self {
        match message.strip_prefix(TEST_MESSAGE_PREFIX) {
            Some(rest) => RequestMode::Synthetic {
                text: rest.to_string(),
            },
            None => RequestMode::Live,
        }
    }

    /// Returns true for synthetic sessions.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, RequestMode::Synthetic { .. })
    }

    /// The text a derived conversation title is taken from: the remainder
    /// for synthetic sessions, the full message otherwise.
    pub fn title_source<'a>(&'a self, message: &'a str) -> &'a str {
        match self {
            RequestMode::Synthetic { text } => text,
            RequestMode::Live => message,
        }
    }
}
