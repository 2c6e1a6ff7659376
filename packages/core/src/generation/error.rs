//! Generation error types
//!
//! Parse failures are kept separate from transport failures so callers can tell a
//! misbehaving model apart from an unreachable one.

use learntree_nlp_engine::GenerationError;
use std::time::Duration;
use thiserror::Error;

/// Model output could not be turned into the expected shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Output was not decodable JSON
    #[error("Malformed model output: {detail}")]
    MalformedOutput { detail: String },

    /// Output decoded but did not match the expected schema
    #[error("Model output does not match schema: {}", problems.join("; "))]
    SchemaMismatch { problems: Vec<String> },
}

impl ParseError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedOutput {
            detail: detail.into(),
        }
    }

    pub fn mismatch(problems: Vec<String>) -> Self {
        Self::SchemaMismatch { problems }
    }
}

/// Failures while generating node fields
#[derive(Error, Debug)]
pub enum NodeGenerationError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Text generation failed: {0}")]
    Transport(#[from] GenerationError),

    #[error("Text generation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl NodeGenerationError {
    /// Whether the upstream model or network is to blame (as opposed to its output)
    pub fn is_upstream(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_upstream(),
            Self::Timeout(_) => true,
            Self::EmptyPrompt | Self::Parse(_) => false,
        }
    }
}

/// Failures while generating flashcards
///
/// Never fatal to a workflow; surfaced only for logging.
#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("Text generation failed: {0}")]
    Transport(#[from] GenerationError),

    #[error("Text generation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
