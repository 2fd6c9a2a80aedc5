//! UI/backend events and error modeling for the desktop GUI controller.

use client_core::AppSnapshot;

pub enum UiEvent {
    Info(String),
    ViewChanged(AppSnapshot),
    Error(UiError),
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
    Connect,
    General,
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
            || message_lower.contains("must use")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
            || message_lower.contains("startup failure")
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

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_line(&self) -> String {
        let prefix = match (self.context, self.category) {
            (UiErrorContext::BackendStartup, _) => "Backend unavailable",
            (UiErrorContext::Connect, UiErrorCategory::Validation) => "Bad server URL",
            (UiErrorContext::Connect, _) => "Could not switch server",
            (UiErrorContext::General, UiErrorCategory::Transport) => "Connection problem",
            (UiErrorContext::General, _) => "Error",
        };
        format!("{prefix}: {}", self.message)
    }
}
