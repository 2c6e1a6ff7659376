//! Command-line driver for the tree workflow
//!
//! Every subcommand maps onto one `TreeService` operation and prints its result as JSON.
//! Workflow errors are reported as an `ErrorPayload` rather than a backtrace.

use anyhow::Context;
use clap::{Parser, Subcommand};
use learntree_core::db::{MemoryStore, SqliteStore, TreeStore};
use learntree_core::generation::{FlashcardGenerator, NodeFieldGenerator};
use learntree_core::layout::FlowLayout;
use learntree_core::services::{
    ChildCreated, CreateChildNode, CreateTree, TreeCreated, TreeRef, TreeService,
    TreeServiceConfig, TreeServiceError,
};
use learntree_core::{Flashcard, Node, TreePage};
use learntree_nlp_engine::{GenerationConfig, GroqClient, TextGenerationClient, UnconfiguredClient};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "learntree-dev", author, version, about = "Drive the LearnTree workflow from the command line", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "LEARNTREE_DB",
        value_name = "FILE",
        help = "Database file (defaults to ~/.learntree/database/learntree.db)"
    )]
    pub db: Option<PathBuf>,

    #[arg(long, global = true, help = "Use a throwaway in-memory store")]
    pub memory: bool,

    #[arg(long, global = true, help = "Skip flashcard generation for new nodes")]
    pub no_flashcards: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Creates a tree with a generated root overview
    CreateTree {
        #[arg(short, long, help = "Owner of the new tree")]
        user: String,

        #[arg(short, long, help = "Display name of the tree")]
        name: String,

        #[arg(help = "Topic for the root node")]
        prompt: String,
    },
    /// Adds a generated node under an existing one
    AddNode {
        #[arg(short, long, help = "Requesting user (must own the tree)")]
        user: String,

        #[arg(short, long, help = "ID of the parent node")]
        parent: i64,

        #[arg(help = "Question the new node should answer")]
        question: String,
    },
    /// Prints the display layout of a tree
    Layout {
        #[arg(long, required_unless_present = "hash", conflicts_with = "hash")]
        tree_id: Option<i64>,

        #[arg(long)]
        hash: Option<String>,
    },
    /// Lists a user's trees, newest first
    Trees {
        #[arg(short, long)]
        user: String,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },
    /// Lists the flashcards of a node
    Flashcards {
        #[arg(help = "ID of the node")]
        node_id: i64,
    },
}

/// Result of one subcommand
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    TreeCreated(TreeCreated),
    ChildCreated(ChildCreated),
    Layout(FlowLayout<Node>),
    Trees(TreePage),
    Flashcards(Vec<Flashcard>),
}

/// `~/.learntree/database/learntree.db`
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
    Ok(home_dir
        .join(".learntree")
        .join("database")
        .join("learntree.db"))
}

/// Open the configured store and generation client
pub async fn build_service(cli: &Cli) -> anyhow::Result<TreeService> {
    let store: Arc<dyn TreeStore> = if cli.memory {
        tracing::info!("📦 Database: in-memory");
        Arc::new(MemoryStore::new())
    } else {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };
        tracing::info!("📦 Database: {}", db_path.display());
        Arc::new(
            SqliteStore::new(db_path)
                .await
                .context("Failed to open database")?,
        )
    };

    let config = GenerationConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid generation config: {}", e))?;
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let client: Arc<dyn TextGenerationClient> = if config.api_key.is_some() {
        tracing::info!("🤖 Model: {} via {}", config.model, config.api_base);
        Arc::new(GroqClient::new(config)?)
    } else {
        tracing::warn!("GROQ_API_KEY is not set; commands that generate content will fail");
        Arc::new(UnconfiguredClient)
    };

    Ok(service_with(store, client, timeout, !cli.no_flashcards)?)
}

/// Assemble a service from already-built parts
pub fn service_with(
    store: Arc<dyn TreeStore>,
    client: Arc<dyn TextGenerationClient>,
    timeout: Duration,
    flashcards: bool,
) -> Result<TreeService, TreeServiceError> {
    let nodes = NodeFieldGenerator::new(client.clone()).with_timeout(timeout);
    let cards = flashcards.then(|| FlashcardGenerator::new(client).with_timeout(timeout));
    let config = TreeServiceConfig {
        generate_flashcards: flashcards,
        ..TreeServiceConfig::default()
    };
    TreeService::new(store, nodes, cards, config)
}

/// Run one subcommand
pub async fn execute(service: &TreeService, command: Commands) -> Result<Output, TreeServiceError> {
    match command {
        Commands::CreateTree { user, name, prompt } => service
            .create_tree(CreateTree {
                name,
                user_id: user,
                prompt,
            })
            .await
            .map(Output::TreeCreated),
        Commands::AddNode {
            user,
            parent,
            question,
        } => service
            .create_child_node(CreateChildNode {
                parent_id: parent,
                user_id: user,
                question,
            })
            .await
            .map(Output::ChildCreated),
        Commands::Layout { tree_id, hash } => {
            let tree = match (tree_id, hash) {
                (Some(id), _) => TreeRef::Id(id),
                (None, Some(hash)) => TreeRef::Hash(hash),
                (None, None) => {
                    return Err(TreeServiceError::invalid_input(
                        "tree",
                        "pass --tree-id or --hash",
                    ))
                }
            };
            service.get_layout(tree).await.map(Output::Layout)
        }
        Commands::Trees {
            user,
            limit,
            offset,
        } => service
            .list_trees(&user, limit, offset)
            .await
            .map(Output::Trees),
        Commands::Flashcards { node_id } => service
            .list_flashcards(node_id)
            .await
            .map(Output::Flashcards),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learntree_core::services::ErrorKind;

    fn memory_service() -> TreeService {
        service_with(
            Arc::new(MemoryStore::new()),
            Arc::new(UnconfiguredClient),
            Duration::from_secs(5),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_create_tree() {
        let cli = Cli::try_parse_from([
            "learntree-dev",
            "--memory",
            "create-tree",
            "--user",
            "alice",
            "--name",
            "Rust",
            "The Rust language",
        ])
        .unwrap();

        assert!(cli.memory);
        assert_eq!(
            cli.command,
            Commands::CreateTree {
                user: "alice".to_string(),
                name: "Rust".to_string(),
                prompt: "The Rust language".to_string(),
            }
        );
    }

    #[test]
    fn test_layout_requires_one_reference() {
        assert!(Cli::try_parse_from(["learntree-dev", "layout"]).is_err());
        assert!(
            Cli::try_parse_from(["learntree-dev", "layout", "--tree-id", "1", "--hash", "abc"])
                .is_err()
        );
        let cli = Cli::try_parse_from(["learntree-dev", "layout", "--hash", "abc"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Layout {
                tree_id: None,
                hash: Some("abc".to_string())
            }
        );
    }

    #[test]
    fn test_default_db_path_location() {
        if let Ok(path) = default_db_path() {
            assert!(path.ends_with(".learntree/database/learntree.db"));
        }
    }

    #[tokio::test]
    async fn test_trees_on_empty_store() {
        let service = memory_service();
        let output = execute(
            &service,
            Commands::Trees {
                user: "alice".to_string(),
                limit: None,
                offset: None,
            },
        )
        .await
        .unwrap();

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["trees"].as_array().unwrap().len(), 0);
        assert_eq!(json["pagination"]["hasMore"], false);
    }

    #[tokio::test]
    async fn test_create_tree_without_api_key_fails_cleanly() {
        let service = memory_service();
        let err = execute(
            &service,
            Commands::CreateTree {
                user: "alice".to_string(),
                name: "Rust".to_string(),
                prompt: "Rust".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::GenerationFailed);
        let payload = serde_json::to_value(err.to_payload()).unwrap();
        assert_eq!(payload["kind"], "generationFailed");
    }

    #[tokio::test]
    async fn test_sqlite_store_is_opened_from_flag() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cli.db");
        let cli = Cli::try_parse_from([
            "learntree-dev",
            "--db",
            db_path.to_str().unwrap(),
            "flashcards",
            "1",
        ])
        .unwrap();

        let service = build_service(&cli).await.unwrap();
        assert!(db_path.exists());

        let err = execute(&service, cli.command).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NodeNotFound);
    }
}
