use thiserror::Error;

/// Failures talking to the enhancement service.
///
/// All variants take the same path in the UI (a generic toast); the detail
/// only reaches the logs.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The envelope carried `success: false`.
    #[error("service rejected the request: {message}")]
    Rejected { message: String },

    /// The body was not the envelope or payload we expected.
    #[error("malformed response: {reason}")]
    Malformed { reason: String },
}

impl RemoteError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Top-level error type for workbench operations.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("history store error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;

/// Trimmed prompt text, or [`WorkbenchError::EmptyPrompt`] for blank input.
pub fn require_prompt(input: &str) -> Result<String> {
    let prompt = input.trim();
    if prompt.is_empty() {
        Err(WorkbenchError::EmptyPrompt)
    } else {
        Ok(prompt.to_string())
    }
}
