//! Node field generation
//!
//! Turns a learner's question into validated node fields by prompting the model and
//! parsing its reply. Persists nothing.

use crate::generation::error::NodeGenerationError;
use crate::generation::parser::{parse_structured_node, NodeStatus};
use crate::generation::prompts;
use crate::generation::DEFAULT_GENERATION_TIMEOUT;
use crate::models::NodeContent;
use learntree_nlp_engine::{GenerationRequest, TextGenerationClient};
use std::sync::Arc;
use std::time::Duration;

/// Fields ready to be written to a node row
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedNode {
    pub name: String,
    /// Markdown, or the JSON string of a structured body
    pub content: String,
    pub followups: Vec<String>,
    pub status: Option<NodeStatus>,
}

#[derive(Clone)]
pub struct NodeFieldGenerator {
    client: Arc<dyn TextGenerationClient>,
    timeout: Duration,
}

impl NodeFieldGenerator {
    pub fn new(client: Arc<dyn TextGenerationClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Bound on the whole send-and-drain of one generation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generate fields for a child node answering `prompt`
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedNode, NodeGenerationError> {
        if prompt.trim().is_empty() {
            return Err(NodeGenerationError::EmptyPrompt);
        }
        self.run(GenerationRequest::new(prompts::node_system_prompt(), prompt))
            .await
    }

    /// Generate fields for the root node of a tree on `topic`
    pub async fn generate_root(&self, topic: &str) -> Result<GeneratedNode, NodeGenerationError> {
        if topic.trim().is_empty() {
            return Err(NodeGenerationError::EmptyPrompt);
        }
        self.run(GenerationRequest::new(
            prompts::node_system_prompt(),
            prompts::root_user_prompt(topic),
        ))
        .await
    }

    async fn run(&self, request: GenerationRequest) -> Result<GeneratedNode, NodeGenerationError> {
        let client = Arc::clone(&self.client);
        let raw = tokio::time::timeout(self.timeout, async move {
            client.send(request).await?.collect().await
        })
        .await
        .map_err(|_| NodeGenerationError::Timeout(self.timeout))??;

        let parsed = parse_structured_node(&raw)?;
        tracing::debug!(
            name = %parsed.name,
            followups = parsed.followups.len(),
            structured = matches!(parsed.content, NodeContent::Structured { .. }),
            "Parsed generated node"
        );

        Ok(GeneratedNode {
            name: parsed.name,
            content: parsed.content.into_stored(),
            followups: parsed.followups,
            status: parsed.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::test_support::ScriptedClient;
    use crate::generation::ParseError;
    use learntree_nlp_engine::GenerationError;
    use serde_json::json;

    fn reply() -> String {
        json!({
            "name": "Borrowing",
            "content": "References let you use a value without owning it.",
            "followups": ["What is a lifetime?"],
            "status": "success"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_generate_from_complete_reply() {
        let client = Arc::new(ScriptedClient::complete(reply()));
        let generator = NodeFieldGenerator::new(client.clone());

        let node = generator.generate("What is borrowing?").await.unwrap();
        assert_eq!(node.name, "Borrowing");
        assert_eq!(node.followups, vec!["What is a lifetime?".to_string()]);
        assert_eq!(node.status, Some(NodeStatus::Success));

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user_prompt, "What is borrowing?");
    }

    #[tokio::test]
    async fn test_streamed_fragments_are_joined() {
        let text = reply();
        let (a, b) = text.split_at(text.len() / 2);
        let client = Arc::new(ScriptedClient::fragments(vec![
            Ok(a.to_string()),
            Ok(b.to_string()),
        ]));

        let node = NodeFieldGenerator::new(client)
            .generate("What is borrowing?")
            .await
            .unwrap();
        assert_eq!(node.name, "Borrowing");
    }

    #[tokio::test]
    async fn test_fragment_error_discards_partial_text() {
        let client = Arc::new(ScriptedClient::fragments(vec![
            Ok(reply()),
            Err(GenerationError::stream("connection reset")),
        ]));

        let err = NodeFieldGenerator::new(client)
            .generate("What is borrowing?")
            .await
            .unwrap_err();
        assert!(matches!(err, NodeGenerationError::Transport(_)));
    }

    #[tokio::test]
    async fn test_empty_prompt_skips_model() {
        let client = Arc::new(ScriptedClient::complete(reply()));
        let err = NodeFieldGenerator::new(client.clone())
            .generate("   ")
            .await
            .unwrap_err();

        assert!(matches!(err, NodeGenerationError::EmptyPrompt));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_reply() {
        let client = Arc::new(ScriptedClient::complete("I cannot help with that."));
        let err = NodeFieldGenerator::new(client)
            .generate("What is borrowing?")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NodeGenerationError::Parse(ParseError::MalformedOutput { .. })
        ));
        assert!(!err.is_upstream());
    }

    #[tokio::test]
    async fn test_structured_content_is_stored_as_json() {
        let client = Arc::new(ScriptedClient::complete(
            json!({
                "name": "Rust",
                "content": { "overview": "A systems language", "subtopics": ["Ownership"] },
                "followups": []
            })
            .to_string(),
        ));

        let node = NodeFieldGenerator::new(client)
            .generate_root("Rust")
            .await
            .unwrap();
        let stored = NodeContent::from_stored(&node.content);
        assert_eq!(stored.overview(), Some("A systems language"));
        assert_eq!(
            stored.to_value(),
            json!({ "overview": "A systems language", "subtopics": ["Ownership"] })
        );
    }

    #[tokio::test]
    async fn test_unfamiliar_content_object_is_stored_verbatim() {
        let content = json!({
            "sections": [{ "title": "Moves" }, { "title": "Copies" }],
            "summary": "Ownership in two parts"
        });
        let client = Arc::new(ScriptedClient::complete(
            json!({ "name": "Ownership", "content": content, "followups": ["What is Copy?"] })
                .to_string(),
        ));

        let node = NodeFieldGenerator::new(client)
            .generate("What is ownership?")
            .await
            .unwrap();
        let stored: serde_json::Value = serde_json::from_str(&node.content).unwrap();
        assert_eq!(stored, content);
        assert_eq!(node.followups, vec!["What is Copy?".to_string()]);
    }

    #[tokio::test]
    async fn test_root_prompt_is_framed() {
        let client = Arc::new(ScriptedClient::complete(reply()));
        NodeFieldGenerator::new(client.clone())
            .generate_root("Rust")
            .await
            .unwrap();

        let requests = client.requests();
        assert!(requests[0]
            .user_prompt
            .starts_with("Create a very broad overview for a topic tree on: Rust."));
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let client = Arc::new(ScriptedClient::complete(reply()).with_delay(Duration::from_secs(5)));
        let err = NodeFieldGenerator::new(client)
            .with_timeout(Duration::from_millis(50))
            .generate("What is borrowing?")
            .await
            .unwrap_err();

        assert!(matches!(err, NodeGenerationError::Timeout(d) if d == Duration::from_millis(50)));
        assert!(err.is_upstream());
    }
}
