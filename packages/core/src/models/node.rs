//! Node Data Structures
//!
//! This module defines the `Node` struct, the unit of learning content in a tree,
//! together with the draft type used to create one.
//!
//! # Architecture
//!
//! - **Storage-assigned IDs**: `id` is an integer assigned by the store on insert
//! - **Parent pointers**: the hierarchy is a flat list of rows linked by `parent_id`;
//!   exactly one node per tree has `parent_id = None`
//! - **Append-only**: nodes are never updated in place by the core
//!
//! # Examples
//!
//! ```rust
//! use learntree_core::models::NodeDraft;
//!
//! let draft = NodeDraft {
//!     user_id: "user-1".to_string(),
//!     question: "What is ownership?".to_string(),
//!     name: "Ownership".to_string(),
//!     content: "Every value has a single owner...".to_string(),
//!     followups: vec!["What is borrowing?".to_string()],
//! };
//! assert!(draft.validate().is_ok());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of suggested follow-up questions on one node
pub const MAX_FOLLOWUPS: usize = 8;

/// Maximum length (in characters) of a user question
pub const MAX_QUESTION_LENGTH: usize = 2000;

/// Validation errors for model construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{field}' is too long ({length} > {max})")]
    TooLong {
        field: String,
        length: usize,
        max: usize,
    },

    #[error("Too many follow-up questions: {0} (max 8)")]
    TooManyFollowups(usize),
}

/// A single unit of learning content.
///
/// # Fields
///
/// - `id`: Storage-assigned identifier
/// - `parent_id`: Parent node (None only for the tree's root)
/// - `tree_id`: Owning tree
/// - `user_id`: Creator; always the owner of the tree
/// - `question`: The prompt the user asked
/// - `name`: Short generated title
/// - `content`: Generated body (markdown, or legacy JSON-encoded `{overview, subtopics}`;
///   see [`NodeContent`](crate::models::NodeContent))
/// - `followups`: Suggested next questions, in display order
/// - `created_at`: Creation timestamp, the canonical sibling ordering key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: i64,

    pub parent_id: Option<i64>,

    pub tree_id: i64,

    pub user_id: String,

    pub question: String,

    pub name: String,

    pub content: String,

    #[serde(default)]
    pub followups: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl Node {
    /// True if this node is its tree's root
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Everything needed to persist a new node except its placement.
///
/// The tree and parent are passed to the store separately so that only
/// `create_tree_with_root` can produce a parentless node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDraft {
    pub user_id: String,
    pub question: String,
    pub name: String,
    pub content: String,
    pub followups: Vec<String>,
}

impl NodeDraft {
    /// Check the draft before it reaches storage
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()));
        }
        if self.question.trim().is_empty() {
            return Err(ValidationError::MissingField("question".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        let length = self.question.chars().count();
        if length > MAX_QUESTION_LENGTH {
            return Err(ValidationError::TooLong {
                field: "question".to_string(),
                length,
                max: MAX_QUESTION_LENGTH,
            });
        }
        if self.followups.len() > MAX_FOLLOWUPS {
            return Err(ValidationError::TooManyFollowups(self.followups.len()));
        }
        Ok(())
    }
}
