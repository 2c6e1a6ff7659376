//! Tree Service - Learning tree workflows
//!
//! Orchestrates node and tree creation across validation, authorization, generation,
//! and storage, plus the read paths used to display a tree.
//!
//! # Creation Order
//!
//! ```text
//! Validating -> Authorizing -> Generating -> Persisting -> EnrichingFlashcards -> Done
//! ```
//!
//! - No model call is made until the request is valid and the requester owns the tree.
//! - Nothing is written until generation succeeded, so a failed generation never leaves
//!   a partial node or an empty tree behind.
//! - Flashcards are best effort: their failure is logged and the creation still succeeds.

use crate::db::TreeStore;
use crate::generation::{FlashcardGenerator, GeneratedNode, NodeFieldGenerator};
use crate::layout::{FlowLayout, LayoutConfig, LayoutEngine};
use crate::models::{
    Flashcard, NewTree, Node, NodeContent, NodeDraft, Pagination, Tree, TreePage,
    TreeWithNodes, ValidationError, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_QUESTION_LENGTH,
};
use crate::services::error::{CreationStage, TreeServiceError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Workflow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeServiceConfig {
    /// Generate flashcards for every new node
    pub generate_flashcards: bool,

    /// Page size when the caller gives none
    pub default_page_limit: u32,

    /// Largest accepted page size
    pub max_page_limit: u32,

    pub layout: LayoutConfig,
}

impl Default for TreeServiceConfig {
    fn default() -> Self {
        Self {
            generate_flashcards: true,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: MAX_PAGE_LIMIT,
            layout: LayoutConfig::default(),
        }
    }
}

impl TreeServiceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_page_limit == 0 {
            return Err("default_page_limit must be greater than 0".to_string());
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(format!(
                "default_page_limit ({}) exceeds max_page_limit ({})",
                self.default_page_limit, self.max_page_limit
            ));
        }
        self.layout.validate()
    }
}

/// Request to add a node under an existing one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChildNode {
    pub parent_id: i64,
    pub user_id: String,
    pub question: String,
}

/// Request to start a new tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTree {
    pub name: String,
    pub user_id: String,
    /// Topic the root node should give an overview of
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildCreated {
    pub node: Node,
    pub followups: Vec<String>,
    /// Empty when flashcard generation is disabled or failed
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeCreated {
    pub tree: Tree,
    pub root_node: Node,
    pub flashcards: Vec<Flashcard>,
}

/// How a caller names a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRef {
    Id(i64),
    Hash(String),
}

impl fmt::Display for TreeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {}", id),
            Self::Hash(hash) => write!(f, "hash {}", hash),
        }
    }
}

pub struct TreeService {
    store: Arc<dyn TreeStore>,
    nodes: NodeFieldGenerator,
    flashcards: Option<FlashcardGenerator>,
    layout: LayoutEngine,
    config: TreeServiceConfig,
}

impl TreeService {
    /// Build a service; rejects an invalid `config` (zero page limits, non-positive spacing)
    pub fn new(
        store: Arc<dyn TreeStore>,
        nodes: NodeFieldGenerator,
        flashcards: Option<FlashcardGenerator>,
        config: TreeServiceConfig,
    ) -> Result<Self, TreeServiceError> {
        config
            .validate()
            .map_err(|detail| TreeServiceError::invalid_input("config", detail))?;
        Ok(Self {
            store,
            nodes,
            flashcards,
            layout: LayoutEngine::new(config.layout.clone()),
            config,
        })
    }

    pub fn config(&self) -> &TreeServiceConfig {
        &self.config
    }

    pub fn layout_engine(&self) -> &LayoutEngine {
        &self.layout
    }

    //
    // MUTATIONS
    //

    /// Generate and store a node answering `question` under `parent_id`
    #[tracing::instrument(
        skip(self, request),
        fields(parent_id = request.parent_id, user_id = %request.user_id)
    )]
    pub async fn create_child_node(
        &self,
        request: CreateChildNode,
    ) -> Result<ChildCreated, TreeServiceError> {
        let result = self.run_create_child_node(request).await;
        if let Err(e) = &result {
            tracing::error!(stage = %e.aborted_at(), "Node creation aborted: {}", e);
        }
        result
    }

    async fn run_create_child_node(
        &self,
        request: CreateChildNode,
    ) -> Result<ChildCreated, TreeServiceError> {
        tracing::debug!(stage = %CreationStage::Validating, "Entering stage");
        let question = request.question.trim();
        validate_question(question)?;
        validate_user_id(&request.user_id)?;

        tracing::debug!(stage = %CreationStage::Authorizing, "Entering stage");
        let parent = self
            .store
            .find_node_by_id(request.parent_id)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Authorizing, e))?
            .ok_or(TreeServiceError::ParentNotFound {
                parent_id: request.parent_id,
            })?;
        let tree = self
            .store
            .find_tree_by_id(parent.tree_id)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Authorizing, e))?
            .ok_or_else(|| TreeServiceError::tree_not_found(TreeRef::Id(parent.tree_id)))?;
        if tree.user_id != request.user_id {
            return Err(TreeServiceError::Unauthorized {
                user_id: request.user_id,
                tree_id: tree.id,
            });
        }

        tracing::debug!(stage = %CreationStage::Generating, "Entering stage");
        let generated = self.nodes.generate(question).await?;

        tracing::debug!(stage = %CreationStage::Persisting, "Entering stage");
        let draft = node_draft(&request.user_id, question, generated);
        let node = self
            .store
            .create_node(parent.tree_id, parent.id, draft)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Persisting, e))?;

        let flashcards = self.enrich_with_flashcards(&node).await;

        tracing::info!(
            node_id = node.id,
            tree_id = node.tree_id,
            flashcards = flashcards.len(),
            "Created node '{}'",
            node.name
        );
        Ok(ChildCreated {
            followups: node.followups.clone(),
            node,
            flashcards,
        })
    }

    /// Generate the root overview for `prompt`, then store the tree and root together
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create_tree(&self, request: CreateTree) -> Result<TreeCreated, TreeServiceError> {
        let result = self.run_create_tree(request).await;
        if let Err(e) = &result {
            tracing::error!(stage = %e.aborted_at(), "Tree creation aborted: {}", e);
        }
        result
    }

    async fn run_create_tree(&self, request: CreateTree) -> Result<TreeCreated, TreeServiceError> {
        tracing::debug!(stage = %CreationStage::Validating, "Entering stage");
        let new_tree = NewTree {
            name: request.name.trim().to_string(),
            user_id: request.user_id.clone(),
        };
        new_tree.validate()?;
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::MissingField("prompt".to_string()).into());
        }
        validate_question(prompt).map_err(|e| rename_field(e, "prompt"))?;

        tracing::debug!(stage = %CreationStage::Generating, "Entering stage");
        let generated = self.nodes.generate_root(prompt).await?;

        tracing::debug!(stage = %CreationStage::Persisting, "Entering stage");
        let draft = node_draft(&request.user_id, prompt, generated);
        let (tree, root_node) = self
            .store
            .create_tree_with_root(new_tree, draft)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Persisting, e))?;

        let flashcards = self.enrich_with_flashcards(&root_node).await;

        tracing::info!(tree_id = tree.id, hash = %tree.hash, "Created tree '{}'", tree.name);
        Ok(TreeCreated {
            tree,
            root_node,
            flashcards,
        })
    }

    /// Best-effort flashcards for a freshly stored node
    async fn enrich_with_flashcards(&self, node: &Node) -> Vec<Flashcard> {
        let Some(generator) = self.flashcards.as_ref().filter(|_| self.config.generate_flashcards)
        else {
            return Vec::new();
        };
        tracing::debug!(
            stage = %CreationStage::EnrichingFlashcards,
            node_id = node.id,
            "Entering stage"
        );

        let content = NodeContent::from_stored(&node.content).as_plain_text();
        let drafts = match generator.generate(&node.name, &content).await {
            Ok(drafts) => drafts,
            Err(e) => {
                tracing::warn!("Skipping flashcards for node {}: {}", node.id, e);
                return Vec::new();
            }
        };

        match self
            .store
            .create_flashcards(node.id, &node.user_id, drafts)
            .await
        {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!("Failed to store flashcards for node {}: {}", node.id, e);
                Vec::new()
            }
        }
    }

    //
    // READS
    //

    /// Full layout of a tree
    pub async fn get_layout(&self, tree: TreeRef) -> Result<FlowLayout<Node>, TreeServiceError> {
        let tree = self.resolve_tree(tree).await?;
        let nodes = self
            .store
            .list_nodes_for_tree(tree.id)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Reading, e))?;
        Ok(self.layout.layout(&nodes))
    }

    /// Tree and all of its nodes, oldest first
    pub async fn get_tree_by_hash(&self, hash: &str) -> Result<TreeWithNodes, TreeServiceError> {
        let tree = self.resolve_tree(TreeRef::Hash(hash.to_string())).await?;
        let nodes = self
            .store
            .list_nodes_for_tree(tree.id)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Reading, e))?;
        Ok(TreeWithNodes { tree, nodes })
    }

    /// One page of the user's trees, newest first
    pub async fn list_trees(
        &self,
        user_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<TreePage, TreeServiceError> {
        validate_user_id(user_id)?;
        let limit = limit.unwrap_or(self.config.default_page_limit);
        if limit == 0 || limit > self.config.max_page_limit {
            return Err(TreeServiceError::invalid_input(
                "limit",
                format!("must be between 1 and {}", self.config.max_page_limit),
            ));
        }
        let offset = offset.unwrap_or(0);

        let total = self
            .store
            .count_trees_for_user(user_id)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Reading, e))?;
        let trees = self
            .store
            .list_trees_for_user(user_id, limit, offset)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Reading, e))?;

        Ok(TreePage {
            trees,
            pagination: Pagination::new(total, limit, offset),
        })
    }

    pub async fn get_node(&self, id: i64) -> Result<Node, TreeServiceError> {
        self.store
            .find_node_by_id(id)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Reading, e))?
            .ok_or(TreeServiceError::NodeNotFound { id })
    }

    /// Flashcards of a node, in creation order
    pub async fn list_flashcards(&self, node_id: i64) -> Result<Vec<Flashcard>, TreeServiceError> {
        self.get_node(node_id).await?;
        self.store
            .list_flashcards_for_node(node_id)
            .await
            .map_err(|e| TreeServiceError::storage(CreationStage::Reading, e))
    }

    async fn resolve_tree(&self, tree: TreeRef) -> Result<Tree, TreeServiceError> {
        let found = match &tree {
            TreeRef::Id(id) => self.store.find_tree_by_id(*id).await,
            TreeRef::Hash(hash) => self.store.find_tree_by_hash(hash).await,
        }
        .map_err(|e| TreeServiceError::storage(CreationStage::Reading, e))?;

        found.ok_or_else(|| TreeServiceError::tree_not_found(tree))
    }
}

fn validate_question(question: &str) -> Result<(), TreeServiceError> {
    if question.is_empty() {
        return Err(ValidationError::MissingField("question".to_string()).into());
    }
    let length = question.chars().count();
    if length > MAX_QUESTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "question".to_string(),
            length,
            max: MAX_QUESTION_LENGTH,
        }
        .into());
    }
    Ok(())
}

fn validate_user_id(user_id: &str) -> Result<(), TreeServiceError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::MissingField("userId".to_string()).into());
    }
    Ok(())
}

fn rename_field(err: TreeServiceError, field: &str) -> TreeServiceError {
    match err {
        TreeServiceError::InvalidInput { detail, .. } => TreeServiceError::InvalidInput {
            field: field.to_string(),
            detail: detail.replace("'question'", &format!("'{}'", field)),
        },
        other => other,
    }
}

fn node_draft(user_id: &str, question: &str, generated: GeneratedNode) -> NodeDraft {
    NodeDraft {
        user_id: user_id.to_string(),
        question: question.to_string(),
        name: generated.name,
        content: generated.content,
        followups: generated.followups,
    }
}
