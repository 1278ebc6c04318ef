use thiserror::Error;

/// Failure of a single call to the answer generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Connection failure or timeout before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the provider's schema.
    #[error("could not decode provider response: {0}")]
    Decode(String),

    /// The provider returned no choices or an empty message.
    #[error("provider returned an empty answer")]
    Empty,

    #[error("unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
}

impl GenerationError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::Empty | Self::UnsupportedProvider(_) => false,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Request-level failures surfaced by the recommendation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("query must not be empty")]
    EmptyQuery,

    /// Generation failed after all retries; no partial result exists.
    #[error("answer generation failed: {0}")]
    Generation(#[from] GenerationError),
}
