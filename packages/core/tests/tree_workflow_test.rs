//! Integration tests for TreeService over the libsql store
//!
//! Tests cover:
//! - Tree creation and child growth persisted through SqliteStore
//! - Ownership checks happening before any model call
//! - All-or-nothing tree creation when generation fails
//! - Best-effort flashcards
//! - Layout and listing read paths

use async_trait::async_trait;
use learntree_core::db::{SqliteStore, TreeStore};
use learntree_core::generation::{FlashcardGenerator, NodeFieldGenerator};
use learntree_core::layout::FlowLayout;
use learntree_core::services::{
    CreateChildNode, CreateTree, ErrorCategory, ErrorKind, TreeRef, TreeService,
    TreeServiceConfig, TreeServiceError,
};
use learntree_core::Node;
use learntree_nlp_engine::{
    GenerationError, GenerationRequest, Result as GenerationResult, TextGeneration,
    TextGenerationClient,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Replays canned replies in order; streams each one in small fragments
struct ReplayClient {
    replies: Mutex<VecDeque<GenerationResult<String>>>,
    calls: Mutex<usize>,
}

impl ReplayClient {
    fn new(replies: Vec<GenerationResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextGenerationClient for ReplayClient {
    async fn send(&self, _request: GenerationRequest) -> GenerationResult<TextGeneration> {
        *self.calls.lock().unwrap() += 1;
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::invalid_response("no reply queued")))?;

        let fragments: Vec<GenerationResult<String>> = reply
            .chars()
            .collect::<Vec<_>>()
            .chunks(7)
            .map(|chunk| Ok(chunk.iter().collect()))
            .collect();
        Ok(TextGeneration::from_fragments(fragments))
    }
}

fn node_json(name: &str) -> GenerationResult<String> {
    Ok(format!(
        "Here you go:\n{}",
        json!({
            "name": name,
            "content": format!("## {}\n\nAn explanation of {}.", name, name),
            "followups": [format!("Why does {} matter?", name)],
            "status": "success"
        })
    ))
}

fn cards_json() -> GenerationResult<String> {
    Ok(json!([
        { "keyword": "Lifetime", "definition": "The region of code where a reference is valid." },
        { "keyword": "Borrow checker", "definition": "The compiler pass enforcing borrowing rules." }
    ])
    .to_string())
}

struct Harness {
    service: TreeService,
    store: Arc<SqliteStore>,
    nodes: Arc<ReplayClient>,
    _temp_dir: TempDir,
}

async fn harness(
    node_replies: Vec<GenerationResult<String>>,
    card_replies: Vec<GenerationResult<String>>,
) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(
        SqliteStore::new(temp_dir.path().join("learntree.db"))
            .await
            .unwrap(),
    );
    let nodes = ReplayClient::new(node_replies);
    let cards = ReplayClient::new(card_replies);

    let service = TreeService::new(
        store.clone(),
        NodeFieldGenerator::new(nodes.clone()),
        Some(FlashcardGenerator::new(cards)),
        TreeServiceConfig::default(),
    )
    .unwrap();
    Harness {
        service,
        store,
        nodes,
        _temp_dir: temp_dir,
    }
}

fn tree_request(user: &str) -> CreateTree {
    CreateTree {
        name: "Rust".to_string(),
        user_id: user.to_string(),
        prompt: "Rust".to_string(),
    }
}

fn child_request(parent: &Node, user: &str, question: &str) -> CreateChildNode {
    CreateChildNode {
        parent_id: parent.id,
        user_id: user.to_string(),
        question: question.to_string(),
    }
}

#[tokio::test]
async fn test_grow_tree_and_lay_it_out() {
    let h = harness(
        vec![
            node_json("Rust"),
            node_json("Ownership"),
            node_json("Borrowing"),
            node_json("Lifetimes"),
        ],
        vec![cards_json(), cards_json(), cards_json(), cards_json()],
    )
    .await;

    let created = h.service.create_tree(tree_request("alice")).await.unwrap();
    let root = created.root_node;
    let ownership = h
        .service
        .create_child_node(child_request(&root, "alice", "What is ownership?"))
        .await
        .unwrap();
    let borrowing = h
        .service
        .create_child_node(child_request(&root, "alice", "What is borrowing?"))
        .await
        .unwrap();
    let lifetimes = h
        .service
        .create_child_node(child_request(&borrowing.node, "alice", "What are lifetimes?"))
        .await
        .unwrap();
    assert_eq!(lifetimes.flashcards.len(), 2);

    let layout = h
        .service
        .get_layout(TreeRef::Hash(created.tree.hash.clone()))
        .await
        .unwrap();
    assert_eq!(layout.nodes.len(), 4);
    assert_eq!(layout.edges.len(), 3);

    let x = |id: i64| layout.position_of(id).unwrap().x;
    let y = |id: i64| layout.position_of(id).unwrap().y;
    assert_eq!(x(ownership.node.id), 0.0);
    assert_eq!(x(lifetimes.node.id), 100.0);
    assert_eq!(x(borrowing.node.id), 100.0);
    assert_eq!(x(root.id), 50.0);
    assert_eq!(y(lifetimes.node.id), -200.0);

    let stored = h.store.list_nodes_for_tree(created.tree.id).await.unwrap();
    assert_eq!(stored.len(), 4);
}

#[tokio::test]
async fn test_other_user_is_rejected_without_model_call() {
    let h = harness(vec![node_json("Rust"), node_json("Nope")], vec![]).await;
    let created = h.service.create_tree(tree_request("alice")).await.unwrap();
    let calls_before = h.nodes.calls();

    let err = h
        .service
        .create_child_node(child_request(&created.root_node, "mallory", "Let me in?"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.status(), 403);
    assert_eq!(err.to_payload().category, ErrorCategory::NoAccess);
    assert_eq!(h.nodes.calls(), calls_before);
    assert_eq!(
        h.store
            .list_nodes_for_tree(created.tree.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_stream_failure_leaves_no_tree() {
    let h = harness(vec![Err(GenerationError::stream("connection reset"))], vec![]).await;

    let err = h
        .service
        .create_tree(tree_request("alice"))
        .await
        .unwrap_err();

    assert!(matches!(err, TreeServiceError::GenerationFailed(_)));
    assert_eq!(err.to_payload().category, ErrorCategory::RetryLater);
    assert_eq!(h.store.count_trees_for_user("alice").await.unwrap(), 0);
}

#[tokio::test]
async fn test_flashcard_failure_keeps_node() {
    let h = harness(
        vec![node_json("Rust"), node_json("Traits")],
        vec![cards_json(), Ok("[]".to_string())],
    )
    .await;
    let created = h.service.create_tree(tree_request("alice")).await.unwrap();

    let child = h
        .service
        .create_child_node(child_request(&created.root_node, "alice", "What are traits?"))
        .await
        .unwrap();

    assert!(child.flashcards.is_empty());
    assert!(h.store.find_node_by_id(child.node.id).await.unwrap().is_some());
    assert!(h
        .service
        .list_flashcards(child.node.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_listing_and_lookup() {
    let h = harness(vec![node_json("One"), node_json("Two")], vec![]).await;
    let first = h.service.create_tree(tree_request("alice")).await.unwrap();
    let second = h.service.create_tree(tree_request("alice")).await.unwrap();

    let page = h.service.list_trees("alice", Some(1), None).await.unwrap();
    assert_eq!(page.trees.len(), 1);
    assert_eq!(page.trees[0].id, second.tree.id);
    assert_eq!(page.trees[0].node_count, 1);
    assert!(page.pagination.has_more);

    let with_nodes = h.service.get_tree_by_hash(&first.tree.hash).await.unwrap();
    assert_eq!(with_nodes.tree.id, first.tree.id);
    assert_eq!(with_nodes.nodes.len(), 1);

    let empty = h.service.list_trees("bob", None, None).await.unwrap();
    assert!(empty.trees.is_empty());
    assert_eq!(empty.pagination.total, 0);
    assert!(!empty.pagination.has_more);

    let err = h.service.get_tree_by_hash("does-not-exist").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TreeNotFound);
}

#[tokio::test]
async fn test_layout_serializes_for_display() {
    let h = harness(vec![node_json("Rust")], vec![]).await;
    let created = h.service.create_tree(tree_request("alice")).await.unwrap();

    let layout: FlowLayout<Node> = h
        .service
        .get_layout(TreeRef::Id(created.tree.id))
        .await
        .unwrap();
    let json = serde_json::to_value(&layout).unwrap();

    assert_eq!(json["nodes"][0]["id"], created.root_node.id);
    assert!(json["nodes"][0]["parentId"].is_null());
    assert_eq!(json["nodes"][0]["position"]["x"], 0.0);
    assert_eq!(json["nodes"][0]["data"]["name"], "Rust");
    assert_eq!(json["edges"].as_array().unwrap().len(), 0);
}
