//! LearnTree Core Business Logic Layer
//!
//! This crate provides storage, content generation, layout, and workflow orchestration
//! for LearnTree, where each learner grows a tree of model-generated lessons by asking
//! follow-up questions.
//!
//! # Architecture
//!
//! - **Parent-pointer rows**: Nodes store only their parent; hierarchy is rebuilt per call
//! - **Generate, then persist**: Model output is validated before anything is written
//! - **libsql**: Embedded SQLite-compatible database behind the `TreeStore` trait
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, Tree, Flashcard, etc.)
//! - [`db`] - Storage trait with libsql and in-memory implementations
//! - [`generation`] - Prompts and output parsing for nodes and flashcards
//! - [`layout`] - Tree layout for display
//! - [`services`] - Workflow orchestration (TreeService)

pub mod db;
pub mod generation;
pub mod layout;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
