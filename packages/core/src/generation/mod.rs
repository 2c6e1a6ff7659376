//! Model-backed content generation
//!
//! Wraps a [`TextGenerationClient`](learntree_nlp_engine::TextGenerationClient) with the
//! prompts and output validation for node fields and flashcards. Nothing here touches
//! storage.

mod error;
mod flashcards;
mod node_fields;
mod parser;
mod prompts;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

pub use error::{FlashcardError, NodeGenerationError, ParseError};
pub use flashcards::{parse_flashcards, FlashcardGenerator};
pub use node_fields::{GeneratedNode, NodeFieldGenerator};
pub use parser::{parse_structured_node, NodeStatus, StructuredNode};
pub use prompts::{flashcard_user_prompt, node_system_prompt, root_user_prompt};

/// Default bound on one send-and-drain
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
