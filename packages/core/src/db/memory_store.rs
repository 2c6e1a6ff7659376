//! MemoryStore - in-process TreeStore implementation
//!
//! Keeps all rows in vectors behind a single `tokio::sync::RwLock`. Every mutation takes
//! the write lock for its whole duration, which makes each trait operation atomic.
//! Used by tests, benchmarks, and the CLI's `--memory` mode.

use crate::db::tree_store::TreeStore;
use crate::models::{
    new_tree_hash, Flashcard, FlashcardDraft, NewTree, Node, NodeDraft, Tree, TreeSummary,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    trees: Vec<Tree>,
    nodes: Vec<Node>,
    flashcards: Vec<Flashcard>,
    last_tree_id: i64,
    last_node_id: i64,
    last_flashcard_id: i64,
}

impl Tables {
    fn insert_node(&mut self, tree_id: i64, parent_id: Option<i64>, draft: NodeDraft) -> Node {
        self.last_node_id += 1;
        let node = Node {
            id: self.last_node_id,
            parent_id,
            tree_id,
            user_id: draft.user_id,
            question: draft.question,
            name: draft.name,
            content: draft.content,
            followups: draft.followups,
            created_at: Utc::now(),
        };
        self.nodes.push(node.clone());
        node
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes across all trees
    pub async fn node_count(&self) -> usize {
        self.tables.read().await.nodes.len()
    }

    /// Number of stored trees across all users
    pub async fn tree_count(&self) -> usize {
        self.tables.read().await.trees.len()
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn find_node_by_id(&self, id: i64) -> Result<Option<Node>> {
        let tables = self.tables.read().await;
        Ok(tables.nodes.iter().find(|n| n.id == id).cloned())
    }

    async fn find_tree_by_id(&self, id: i64) -> Result<Option<Tree>> {
        let tables = self.tables.read().await;
        Ok(tables.trees.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tree_by_hash(&self, hash: &str) -> Result<Option<Tree>> {
        let tables = self.tables.read().await;
        Ok(tables.trees.iter().find(|t| t.hash == hash).cloned())
    }

    async fn create_node(&self, tree_id: i64, parent_id: i64, draft: NodeDraft) -> Result<Node> {
        draft.validate()?;
        let mut tables = self.tables.write().await;

        if !tables.trees.iter().any(|t| t.id == tree_id) {
            bail!("Tree {} does not exist", tree_id);
        }
        let parent = tables
            .nodes
            .iter()
            .find(|n| n.id == parent_id)
            .ok_or_else(|| anyhow!("Parent node {} does not exist", parent_id))?;
        if parent.tree_id != tree_id {
            bail!(
                "Parent node {} belongs to tree {}, not {}",
                parent_id,
                parent.tree_id,
                tree_id
            );
        }

        Ok(tables.insert_node(tree_id, Some(parent_id), draft))
    }

    async fn create_tree_with_root(&self, tree: NewTree, root: NodeDraft) -> Result<(Tree, Node)> {
        // Validate both rows before touching the tables
        tree.validate()?;
        root.validate()?;

        let mut tables = self.tables.write().await;
        tables.last_tree_id += 1;
        let created = Tree {
            id: tables.last_tree_id,
            hash: new_tree_hash(),
            name: tree.name,
            user_id: tree.user_id,
            created_at: Utc::now(),
        };
        tables.trees.push(created.clone());
        let root = tables.insert_node(created.id, None, root);

        Ok((created, root))
    }

    async fn create_flashcards(
        &self,
        node_id: i64,
        user_id: &str,
        cards: Vec<FlashcardDraft>,
    ) -> Result<Vec<Flashcard>> {
        let mut tables = self.tables.write().await;
        if !tables.nodes.iter().any(|n| n.id == node_id) {
            bail!("Node {} does not exist", node_id);
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(cards.len());
        for card in cards {
            tables.last_flashcard_id += 1;
            created.push(Flashcard {
                id: tables.last_flashcard_id,
                node_id,
                user_id: user_id.to_string(),
                keyword: card.keyword,
                definition: card.definition,
                created_at: now,
            });
        }
        tables.flashcards.extend(created.iter().cloned());

        Ok(created)
    }

    async fn list_nodes_for_tree(&self, tree_id: i64) -> Result<Vec<Node>> {
        let tables = self.tables.read().await;
        let mut nodes: Vec<Node> = tables
            .nodes
            .iter()
            .filter(|n| n.tree_id == tree_id)
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(nodes)
    }

    async fn list_trees_for_user(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TreeSummary>> {
        let tables = self.tables.read().await;
        let mut trees: Vec<&Tree> = tables.trees.iter().filter(|t| t.user_id == user_id).collect();
        trees.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(trees
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|t| TreeSummary {
                id: t.id,
                hash: t.hash.clone(),
                name: t.name.clone(),
                node_count: tables.nodes.iter().filter(|n| n.tree_id == t.id).count() as u64,
                created_at: t.created_at,
            })
            .collect())
    }

    async fn count_trees_for_user(&self, user_id: &str) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.trees.iter().filter(|t| t.user_id == user_id).count() as u64)
    }

    async fn list_flashcards_for_node(&self, node_id: i64) -> Result<Vec<Flashcard>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flashcards
            .iter()
            .filter(|f| f.node_id == node_id)
            .cloned()
            .collect())
    }
}
