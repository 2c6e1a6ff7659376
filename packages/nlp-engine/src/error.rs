/// Error types for the text generation engine
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API key missing - set GROQ_API_KEY")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Stream interrupted: {0}")]
    Stream(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// True when the provider itself rejected or failed the request (as opposed to
    /// local misconfiguration).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Api { .. } | Self::Stream(_) | Self::InvalidResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
