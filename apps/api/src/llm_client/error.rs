use serde::Serialize;
use thiserror::Error;

/// Failure raised inside a single generation invocation.
///
/// Retryability is decided here so the retry loop never has to inspect messages.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    #[error("attempt timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("generation endpoint rejected the credential: {0}")]
    Unauthorized(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<GenerationError>,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GenerationError {
    pub fn network(message: impl Into<String>) -> Self {
        GenerationError::Transport {
            status: None,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationError::Transport { .. } => FailureKind::Transport,
            GenerationError::Timeout { .. } => FailureKind::Timeout,
            GenerationError::Unauthorized(_) => FailureKind::Unauthorized,
            GenerationError::Malformed(_) => FailureKind::Malformed,
            GenerationError::ValidationFailed(_) => FailureKind::ValidationFailed,
            GenerationError::Exhausted { .. } => FailureKind::Exhausted,
            GenerationError::Configuration(_) => FailureKind::Configuration,
        }
    }

    /// Transport hiccups, timeouts and unparseable output are worth another attempt.
    /// Credentials, configuration and well-formed-but-incomplete answers are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Transport { retryable, .. } => *retryable,
            GenerationError::Timeout { .. } | GenerationError::Malformed(_) => true,
            _ => false,
        }
    }

    /// Short, user-facing description. Never includes upstream payloads.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Transport { status: None, .. } => {
                "Network error. Please check your connection and try again.".to_string()
            }
            GenerationError::Transport {
                status: Some(429), ..
            } => "The AI service is busy right now. Please try again shortly.".to_string(),
            GenerationError::Transport { status: Some(s), .. } => {
                format!("The AI service returned an error (status {s}).")
            }
            GenerationError::Timeout { .. } => {
                "The AI service took too long to respond.".to_string()
            }
            GenerationError::Unauthorized(_) => {
                "Invalid API key or unauthorized access to the AI service.".to_string()
            }
            GenerationError::Malformed(_) => {
                "The AI service returned a response we could not read.".to_string()
            }
            GenerationError::ValidationFailed(detail) => {
                format!("The generated result was incomplete: {detail}.")
            }
            GenerationError::Exhausted { attempts, last } => format!(
                "Generation failed after {attempts} attempts. {}",
                last.user_message()
            ),
            GenerationError::Configuration(detail) => {
                format!("The service is not configured correctly: {detail}.")
            }
        }
    }

    pub fn into_record(self, attempts: u32) -> FailureRecord {
        let attempts = match &self {
            GenerationError::Exhausted { attempts, .. } => *attempts,
            _ => attempts,
        };
        FailureRecord {
            kind: self.kind(),
            message: self.user_message(),
            attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Timeout,
    Unauthorized,
    Malformed,
    ValidationFailed,
    Exhausted,
    Configuration,
}

impl FailureKind {
    /// Credential and configuration failures are never papered over with canned data.
    pub fn allows_fallback(self) -> bool {
        !matches!(self, FailureKind::Unauthorized | FailureKind::Configuration)
    }
}

/// Terminal outcome of a failed invocation, returned to the caller as-is.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct FailureRecord {
    pub kind: FailureKind,
    pub message: String,
    pub attempts: u32,
}
