//! Data Models
//!
//! This module contains the core data structures used throughout LearnTree:
//!
//! - `Node` - One unit of learning content (question, generated answer, follow-ups)
//! - `Tree` - A rooted collection of nodes owned by one user
//! - `Flashcard` - Keyword/definition pair derived from a node
//! - `NodeContent` - Detect-and-degrade view of a node's stored body

mod content;
mod node;
mod tree;

pub use content::NodeContent;
pub use node::{Node, NodeDraft, ValidationError, MAX_FOLLOWUPS, MAX_QUESTION_LENGTH};
pub use tree::{
    new_tree_hash, Flashcard, FlashcardDraft, NewTree, Pagination, Tree, TreePage, TreeSummary,
    TreeWithNodes, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_TREE_NAME_LENGTH,
};
