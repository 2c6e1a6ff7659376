//! Service Layer Error Types
//!
//! [`TreeServiceError`] is what workflow callers see. Each error knows the
//! [`CreationStage`] it aborted at and maps to a caller-facing [`ErrorKind`] with an
//! HTTP-equivalent status and an [`ErrorCategory`].

use crate::generation::NodeGenerationError;
use crate::models::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ordered steps of a node or tree creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreationStage {
    Validating,
    Authorizing,
    Generating,
    Persisting,
    EnrichingFlashcards,
    Done,
    /// Read paths outside any creation
    Reading,
}

impl fmt::Display for CreationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Authorizing => "authorizing",
            Self::Generating => "generating",
            Self::Persisting => "persisting",
            Self::EnrichingFlashcards => "enriching flashcards",
            Self::Done => "done",
            Self::Reading => "reading",
        };
        f.write_str(name)
    }
}

/// Workflow errors
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// Request field failed validation
    #[error("Invalid {field}: {detail}")]
    InvalidInput { field: String, detail: String },

    #[error("Parent node not found: {parent_id}")]
    ParentNotFound { parent_id: i64 },

    #[error("Tree not found: {reference}")]
    TreeNotFound { reference: String },

    #[error("Node not found: {id}")]
    NodeNotFound { id: i64 },

    /// Requester does not own the tree
    #[error("User {user_id} does not own tree {tree_id}")]
    Unauthorized { user_id: String, tree_id: i64 },

    #[error("Content generation failed: {0}")]
    GenerationFailed(#[from] NodeGenerationError),

    #[error("Storage failed while {stage}: {source}")]
    Storage {
        stage: CreationStage,
        #[source]
        source: anyhow::Error,
    },
}

impl TreeServiceError {
    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Create a tree not found error
    pub fn tree_not_found(reference: impl fmt::Display) -> Self {
        Self::TreeNotFound {
            reference: reference.to_string(),
        }
    }

    /// Create a storage error for the given stage
    pub fn storage(stage: CreationStage, source: anyhow::Error) -> Self {
        Self::Storage { stage, source }
    }

    /// Stage the workflow was in when this error stopped it
    pub fn aborted_at(&self) -> CreationStage {
        match self {
            Self::InvalidInput { .. } => CreationStage::Validating,
            Self::ParentNotFound { .. }
            | Self::TreeNotFound { .. }
            | Self::NodeNotFound { .. }
            | Self::Unauthorized { .. } => CreationStage::Authorizing,
            Self::GenerationFailed(_) => CreationStage::Generating,
            Self::Storage { stage, .. } => *stage,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::ParentNotFound { .. } => ErrorKind::ParentNotFound,
            Self::TreeNotFound { .. } => ErrorKind::TreeNotFound,
            Self::NodeNotFound { .. } => ErrorKind::NodeNotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::GenerationFailed(_) => ErrorKind::GenerationFailed,
            Self::Storage { .. } => ErrorKind::StorageFailed,
        }
    }

    /// HTTP-equivalent status
    ///
    /// Generation failures caused by the model's output rather than the provider map to
    /// 500 instead of the kind's 502.
    pub fn status(&self) -> u16 {
        match self {
            Self::GenerationFailed(e) if !e.is_upstream() => 500,
            _ => self.kind().status(),
        }
    }

    /// Serializable form for callers; never includes a backtrace
    pub fn to_payload(&self) -> ErrorPayload {
        let kind = self.kind();
        ErrorPayload {
            kind,
            category: kind.category(),
            detail: self.to_string(),
        }
    }
}

impl From<ValidationError> for TreeServiceError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::MissingField(field) => field.clone(),
            ValidationError::TooLong { field, .. } => field.clone(),
            ValidationError::TooManyFollowups(_) => "followups".to_string(),
        };
        Self::InvalidInput {
            field,
            detail: err.to_string(),
        }
    }
}

/// Caller-facing error tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidInput,
    ParentNotFound,
    TreeNotFound,
    NodeNotFound,
    Unauthorized,
    GenerationFailed,
    StorageFailed,
}

impl ErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::ParentNotFound | Self::TreeNotFound | Self::NodeNotFound => 404,
            Self::Unauthorized => 403,
            Self::GenerationFailed => 502,
            Self::StorageFailed => 500,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput
            | Self::ParentNotFound
            | Self::TreeNotFound
            | Self::NodeNotFound => ErrorCategory::FixInput,
            Self::Unauthorized => ErrorCategory::NoAccess,
            Self::GenerationFailed | Self::StorageFailed => ErrorCategory::RetryLater,
        }
    }
}

/// What the caller can do about an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    /// Change the request and resubmit
    FixInput,
    /// Same request may succeed later
    RetryLater,
    /// Requester lacks access
    NoAccess,
}

/// Error body returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub category: ErrorCategory,
    pub detail: String,
}
