//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`CronpilotError`] via `#[from]`.

/// Top-level error shared by every crate of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CronpilotError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid cron expression `{expression}`: {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("invalid identifier `{0}`")]
    InvalidId(String),

    #[error("invalid value `{0}`")]
    InvalidValue(String),

    #[error("unknown timezone `{0}`")]
    InvalidTimezone(String),

    #[error("execution {0} already reached a terminal status")]
    ExecutionAlreadyFinished(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures of the AI completion provider.
///
/// The display form is the upstream message as-is, so that it can be stored
/// verbatim on a failed execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("AI provider is not configured")]
    Unavailable,

    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// An action handler failed while running its side effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} action failed: {message}")]
pub struct ActionError {
    pub kind: &'static str,
    pub message: String,
}

impl ActionError {
    #[must_use]
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
