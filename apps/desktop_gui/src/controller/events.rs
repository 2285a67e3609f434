//! UI/backend events and error modeling for desktop GUI controller.

use client_core::FetchError;
use shared::domain::UserRecord;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    UsersFetched(Result<Vec<UserRecord>, FetchError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FetchUsers,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("malformed")
            || message_lower.contains("duplicate")
            || message_lower.contains("unsupported")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timed out")
            || message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
            || message_lower.contains("responded with")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_line(&self) -> String {
        let prefix = match self.context {
            UiErrorContext::BackendStartup => "Backend startup failed",
            UiErrorContext::FetchUsers => "Could not load users",
        };
        let hint = match (self.context, self.category) {
            (_, UiErrorCategory::Transport) => " (check the server URL and network)",
            (UiErrorContext::BackendStartup, UiErrorCategory::Validation) => {
                " (check the configured server URL)"
            }
            (_, UiErrorCategory::Validation) => " (the server sent unexpected data)",
            (_, UiErrorCategory::Unknown) => "",
        };
        format!("{prefix}: {}{hint}", self.message)
    }
}
