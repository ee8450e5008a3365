use thiserror::Error;

/// Client-level error type.
///
/// Every failure path in the client ends here. None of them are fatal to a
/// running session: callers surface `user_message()` as a notification and
/// keep their previous state.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent (bad file, bad JSON).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the structured `detail`/`error` field
    /// of the body when the backend provided one.
    #[error("Backend error (status {status}): {}", message.as_deref().unwrap_or("no details"))]
    Backend { status: u16, message: Option<String> },

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    /// An action was triggered without its prerequisite selection.
    #[error("Missing selection: {0}")]
    MissingSelection(&'static str),
}

impl ClientError {
    /// The most specific message available for the user, or `None` when the
    /// caller's generic fallback should be shown instead.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ClientError::Validation(msg) => Some(msg.clone()),
            ClientError::Backend { message, .. } => message
                .as_ref()
                .filter(|m| !m.trim().is_empty())
                .cloned(),
            ClientError::Transport(e) => Some(e.to_string()),
            ClientError::MalformedResponse(e) => Some(format!("Malformed response: {e}")),
            ClientError::Storage(msg) => Some(msg.clone()),
            ClientError::MissingSelection(what) => Some(format!("Please select {what} first")),
        }
    }

    /// `user_message()` with a fallback applied.
    pub fn message_or(&self, fallback: &str) -> String {
        self.user_message().unwrap_or_else(|| fallback.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}
