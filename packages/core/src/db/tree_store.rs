//! TreeStore Trait - Storage Abstraction Layer
//!
//! This module defines the `TreeStore` trait, the narrow storage contract the tree
//! workflow depends on. Any backend offering these operations with the stated atomicity
//! suffices; the crate ships [`MemoryStore`](crate::db::MemoryStore) and
//! [`SqliteStore`](crate::db::SqliteStore).
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so embedded and networked backends fit
//! 2. **Ownership Semantics**: Create methods take drafts by value
//! 3. **Error Handling**: Uses `anyhow::Result`; the service layer maps failures to
//!    `TreeServiceError::Storage`
//! 4. **Atomic Units**: `create_tree_with_root` and `create_flashcards` are all-or-nothing
//!
//! # Examples
//!
//! ```rust,no_run
//! use learntree_core::db::{MemoryStore, TreeStore};
//! use learntree_core::models::{NewTree, NodeDraft};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn TreeStore> = Arc::new(MemoryStore::new());
//!
//!     let (tree, root) = store
//!         .create_tree_with_root(
//!             NewTree { name: "Rust".into(), user_id: "u1".into() },
//!             NodeDraft {
//!                 user_id: "u1".into(),
//!                 question: "Rust".into(),
//!                 name: "Rust overview".into(),
//!                 content: "...".into(),
//!                 followups: vec![],
//!             },
//!         )
//!         .await?;
//!     assert_eq!(root.tree_id, tree.id);
//!     Ok(())
//! }
//! ```

use crate::models::{Flashcard, FlashcardDraft, NewTree, Node, NodeDraft, Tree, TreeSummary};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction layer for tree, node, and flashcard persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single store can be shared by concurrent
/// request handlers behind an `Arc`.
#[async_trait]
pub trait TreeStore: Send + Sync {
    //
    // LOOKUPS
    //

    /// Get node by ID
    ///
    /// - `Ok(Some(node))` if the node exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn find_node_by_id(&self, id: i64) -> Result<Option<Node>>;

    /// Get tree by relational ID
    async fn find_tree_by_id(&self, id: i64) -> Result<Option<Tree>>;

    /// Get tree by its external hash
    async fn find_tree_by_hash(&self, hash: &str) -> Result<Option<Tree>>;

    //
    // MUTATIONS
    //

    /// Create a non-root node under `parent_id` in `tree_id`
    ///
    /// Assigns `id` and `created_at`. Must either insert the node or leave storage
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the tree or parent doesn't exist, or the parent belongs to
    /// another tree.
    async fn create_node(&self, tree_id: i64, parent_id: i64, draft: NodeDraft) -> Result<Node>;

    /// Create a tree and its root node as one atomic unit
    ///
    /// Either both rows exist afterwards or neither does.
    async fn create_tree_with_root(&self, tree: NewTree, root: NodeDraft) -> Result<(Tree, Node)>;

    /// Create a batch of flashcards for one node as one atomic unit
    ///
    /// An empty batch is a no-op that returns an empty vector.
    async fn create_flashcards(
        &self,
        node_id: i64,
        user_id: &str,
        cards: Vec<FlashcardDraft>,
    ) -> Result<Vec<Flashcard>>;

    //
    // LISTINGS
    //

    /// All nodes of a tree ordered by `created_at`, then `id`
    async fn list_nodes_for_tree(&self, tree_id: i64) -> Result<Vec<Node>>;

    /// A page of the user's trees, newest first, with node counts
    async fn list_trees_for_user(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TreeSummary>>;

    /// Total number of trees owned by the user
    async fn count_trees_for_user(&self, user_id: &str) -> Result<u64>;

    /// Flashcards attached to a node, in creation order
    async fn list_flashcards_for_node(&self, node_id: i64) -> Result<Vec<Flashcard>>;
}
