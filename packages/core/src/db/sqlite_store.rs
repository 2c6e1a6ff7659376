//! SqliteStore - libsql-backed TreeStore implementation
//!
//! Persists trees, nodes, and flashcards in a local SQLite file through libsql.
//!
//! # Connection Handling
//!
//! Every operation opens its own connection via [`SqliteStore::connect_with_timeout`],
//! which sets `busy_timeout` and enables foreign keys on that connection. Multi-row
//! writes run inside an explicit `BEGIN TRANSACTION` / `COMMIT` on a single connection
//! and issue `ROLLBACK` on any failure.
//!
//! # Timestamps
//!
//! `created_at` is written as RFC3339 with fixed microsecond precision and a `Z` suffix,
//! so lexical `ORDER BY created_at` matches chronological order.

use crate::db::error::DatabaseError;
use crate::db::tree_store::TreeStore;
use crate::models::{
    new_tree_hash, Flashcard, FlashcardDraft, NewTree, Node, NodeDraft, Tree, TreeSummary,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use libsql::{Builder, Database};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const NODE_COLUMNS: &str =
    "id, parent_id, tree_id, user_id, question, name, content, followups, created_at";
const TREE_COLUMNS: &str = "id, hash, name, user_id, created_at";
const FLASHCARD_COLUMNS: &str = "id, node_id, user_id, keyword, definition, created_at";

/// libsql store
pub struct SqliteStore {
    db: Arc<Database>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and initialize the schema
    ///
    /// Creates missing parent directories. Schema creation is idempotent.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let store = Self {
            db: Arc::new(db),
            db_path,
        };
        store.initialize_schema().await?;

        tracing::debug!(path = %store.db_path.display(), "SQLite store ready");
        Ok(store)
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// PRAGMA statements return rows, so they go through `query()` rather than `execute()`
    async fn execute_pragma(conn: &libsql::Connection, pragma: &str) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        Self::execute_pragma(&conn, "PRAGMA journal_mode = WAL").await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS trees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hash TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create trees table: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS nodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER REFERENCES nodes(id) ON DELETE CASCADE,
                tree_id INTEGER NOT NULL REFERENCES trees(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                question TEXT NOT NULL,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                followups TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create nodes table: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS flashcards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                keyword TEXT NOT NULL CHECK (length(keyword) > 0),
                definition TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create flashcards table: {}",
                e
            ))
        })?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_trees_user ON trees(user_id, created_at)",
            "CREATE INDEX IF NOT EXISTS idx_nodes_tree ON nodes(tree_id)",
            "CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id)",
            "CREATE INDEX IF NOT EXISTS idx_flashcards_node ON flashcards(node_id)",
        ] {
            conn.execute(index, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!("Failed to create index: {}", e))
            })?;
        }

        Ok(())
    }

    /// Get an async connection with busy timeout and foreign keys configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.db.connect().map_err(DatabaseError::LibsqlError)?;
        Self::execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;
        Self::execute_pragma(&conn, "PRAGMA foreign_keys = ON").await?;
        Ok(conn)
    }

    /// Current time truncated to the stored precision
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Unable to parse timestamp '{}'", s))?;
        Ok(parsed.with_timezone(&Utc))
    }

    fn row_to_node(row: &libsql::Row) -> Result<Node> {
        let id: i64 = row.get(0).context("Failed to get id")?;
        let parent_id: Option<i64> = row.get(1).context("Failed to get parent_id")?;
        let tree_id: i64 = row.get(2).context("Failed to get tree_id")?;
        let user_id: String = row.get(3).context("Failed to get user_id")?;
        let question: String = row.get(4).context("Failed to get question")?;
        let name: String = row.get(5).context("Failed to get name")?;
        let content: String = row.get(6).context("Failed to get content")?;
        let followups_json: String = row.get(7).context("Failed to get followups")?;
        let created_at_str: String = row.get(8).context("Failed to get created_at")?;

        let followups: Vec<String> =
            serde_json::from_str(&followups_json).context("Failed to parse followups JSON")?;

        Ok(Node {
            id,
            parent_id,
            tree_id,
            user_id,
            question,
            name,
            content,
            followups,
            created_at: Self::parse_timestamp(&created_at_str)
                .context("Failed to parse created_at")?,
        })
    }

    fn row_to_tree(row: &libsql::Row) -> Result<Tree> {
        let created_at_str: String = row.get(4).context("Failed to get created_at")?;
        Ok(Tree {
            id: row.get(0).context("Failed to get id")?,
            hash: row.get(1).context("Failed to get hash")?,
            name: row.get(2).context("Failed to get name")?,
            user_id: row.get(3).context("Failed to get user_id")?,
            created_at: Self::parse_timestamp(&created_at_str)
                .context("Failed to parse created_at")?,
        })
    }

    fn row_to_flashcard(row: &libsql::Row) -> Result<Flashcard> {
        let created_at_str: String = row.get(5).context("Failed to get created_at")?;
        Ok(Flashcard {
            id: row.get(0).context("Failed to get id")?,
            node_id: row.get(1).context("Failed to get node_id")?,
            user_id: row.get(2).context("Failed to get user_id")?,
            keyword: row.get(3).context("Failed to get keyword")?,
            definition: row.get(4).context("Failed to get definition")?,
            created_at: Self::parse_timestamp(&created_at_str)
                .context("Failed to parse created_at")?,
        })
    }

    /// Insert one node on an existing connection and return it
    async fn insert_node(
        conn: &libsql::Connection,
        tree_id: i64,
        parent_id: Option<i64>,
        draft: NodeDraft,
    ) -> Result<Node> {
        let created_at = Self::now();
        let followups =
            serde_json::to_string(&draft.followups).context("Failed to serialize followups")?;

        let mut rows = conn
            .query(
                "INSERT INTO nodes (parent_id, tree_id, user_id, question, name, content, followups, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
                (
                    parent_id,
                    tree_id,
                    draft.user_id.as_str(),
                    draft.question.as_str(),
                    draft.name.as_str(),
                    draft.content.as_str(),
                    followups,
                    Self::format_timestamp(&created_at),
                ),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert node: {}", e)))?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::sql_execution("Node insert returned no id"))?;
        let id: i64 = row.get(0).context("Failed to get inserted node id")?;

        Ok(Node {
            id,
            parent_id,
            tree_id,
            user_id: draft.user_id,
            question: draft.question,
            name: draft.name,
            content: draft.content,
            followups: draft.followups,
            created_at,
        })
    }

    async fn insert_tree(conn: &libsql::Connection, tree: NewTree) -> Result<Tree> {
        let created_at = Self::now();
        let hash = new_tree_hash();

        let mut rows = conn
            .query(
                "INSERT INTO trees (hash, name, user_id, created_at) VALUES (?, ?, ?, ?) RETURNING id",
                (
                    hash.as_str(),
                    tree.name.as_str(),
                    tree.user_id.as_str(),
                    Self::format_timestamp(&created_at),
                ),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert tree: {}", e)))?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::sql_execution("Tree insert returned no id"))?;

        Ok(Tree {
            id: row.get(0).context("Failed to get inserted tree id")?,
            hash,
            name: tree.name,
            user_id: tree.user_id,
            created_at,
        })
    }

    async fn insert_flashcards(
        conn: &libsql::Connection,
        node_id: i64,
        user_id: &str,
        cards: Vec<FlashcardDraft>,
    ) -> Result<Vec<Flashcard>> {
        let created_at = Self::now();
        let created_at_str = Self::format_timestamp(&created_at);
        let mut created = Vec::with_capacity(cards.len());

        for card in cards {
            let mut rows = conn
                .query(
                    "INSERT INTO flashcards (node_id, user_id, keyword, definition, created_at)
                     VALUES (?, ?, ?, ?, ?) RETURNING id",
                    (
                        node_id,
                        user_id,
                        card.keyword.as_str(),
                        card.definition.as_str(),
                        created_at_str.as_str(),
                    ),
                )
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!("Failed to insert flashcard: {}", e))
                })?;
            let row = rows
                .next()
                .await?
                .ok_or_else(|| DatabaseError::sql_execution("Flashcard insert returned no id"))?;

            created.push(Flashcard {
                id: row.get(0).context("Failed to get inserted flashcard id")?,
                node_id,
                user_id: user_id.to_string(),
                keyword: card.keyword,
                definition: card.definition,
                created_at,
            });
        }

        Ok(created)
    }

    async fn node_tree_id(conn: &libsql::Connection, node_id: i64) -> Result<Option<i64>> {
        let mut rows = conn
            .query("SELECT tree_id FROM nodes WHERE id = ?", [node_id])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to query node: {}", e)))?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0).context("Failed to get tree_id")?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TreeStore for SqliteStore {
    async fn find_node_by_id(&self, id: i64) -> Result<Option<Node>> {
        let conn = self.connect_with_timeout().await?;
        let sql = format!("SELECT {} FROM nodes WHERE id = ?", NODE_COLUMNS);
        let mut rows = conn.query(&sql, [id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_node(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_tree_by_id(&self, id: i64) -> Result<Option<Tree>> {
        let conn = self.connect_with_timeout().await?;
        let sql = format!("SELECT {} FROM trees WHERE id = ?", TREE_COLUMNS);
        let mut rows = conn.query(&sql, [id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_tree(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_tree_by_hash(&self, hash: &str) -> Result<Option<Tree>> {
        let conn = self.connect_with_timeout().await?;
        let sql = format!("SELECT {} FROM trees WHERE hash = ?", TREE_COLUMNS);
        let mut rows = conn.query(&sql, [hash]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_tree(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_node(&self, tree_id: i64, parent_id: i64, draft: NodeDraft) -> Result<Node> {
        draft.validate()?;
        let conn = self.connect_with_timeout().await?;

        match Self::node_tree_id(&conn, parent_id).await? {
            None => return Err(DatabaseError::missing("parent node", parent_id).into()),
            Some(parent_tree) if parent_tree != tree_id => {
                anyhow::bail!(
                    "Parent node {} belongs to tree {}, not {}",
                    parent_id,
                    parent_tree,
                    tree_id
                );
            }
            Some(_) => {}
        }

        Self::insert_node(&conn, tree_id, Some(parent_id), draft).await
    }

    async fn create_tree_with_root(&self, tree: NewTree, root: NodeDraft) -> Result<(Tree, Node)> {
        tree.validate()?;
        root.validate()?;

        let conn = self.connect_with_timeout().await?;
        conn.execute("BEGIN TRANSACTION", ())
            .await
            .context("Failed to begin transaction")?;

        let result = async {
            let created = Self::insert_tree(&conn, tree).await?;
            let root = Self::insert_node(&conn, created.id, None, root).await?;
            Ok::<_, anyhow::Error>((created, root))
        }
        .await;

        match result {
            Ok(pair) => {
                conn.execute("COMMIT", ())
                    .await
                    .context("Failed to commit transaction")?;
                Ok(pair)
            }
            Err(e) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }

    async fn create_flashcards(
        &self,
        node_id: i64,
        user_id: &str,
        cards: Vec<FlashcardDraft>,
    ) -> Result<Vec<Flashcard>> {
        let conn = self.connect_with_timeout().await?;
        if Self::node_tree_id(&conn, node_id).await?.is_none() {
            return Err(DatabaseError::missing("node", node_id).into());
        }
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        conn.execute("BEGIN TRANSACTION", ())
            .await
            .context("Failed to begin transaction")?;

        match Self::insert_flashcards(&conn, node_id, user_id, cards).await {
            Ok(created) => {
                conn.execute("COMMIT", ())
                    .await
                    .context("Failed to commit transaction")?;
                Ok(created)
            }
            Err(e) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }

    async fn list_nodes_for_tree(&self, tree_id: i64) -> Result<Vec<Node>> {
        let conn = self.connect_with_timeout().await?;
        let sql = format!(
            "SELECT {} FROM nodes WHERE tree_id = ? ORDER BY created_at ASC, id ASC",
            NODE_COLUMNS
        );
        let mut rows = conn.query(&sql, [tree_id]).await?;

        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await? {
            nodes.push(Self::row_to_node(&row)?);
        }
        Ok(nodes)
    }

    async fn list_trees_for_user(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TreeSummary>> {
        let conn = self.connect_with_timeout().await?;
        let mut rows = conn
            .query(
                "SELECT t.id, t.hash, t.name, t.created_at,
                        (SELECT COUNT(*) FROM nodes n WHERE n.tree_id = t.id)
                 FROM trees t
                 WHERE t.user_id = ?
                 ORDER BY t.created_at DESC, t.id DESC
                 LIMIT ? OFFSET ?",
                (user_id, limit as i64, offset as i64),
            )
            .await?;

        let mut trees = Vec::new();
        while let Some(row) = rows.next().await? {
            let created_at_str: String = row.get(3).context("Failed to get created_at")?;
            let node_count: i64 = row.get(4).context("Failed to get node count")?;
            trees.push(TreeSummary {
                id: row.get(0).context("Failed to get id")?,
                hash: row.get(1).context("Failed to get hash")?,
                name: row.get(2).context("Failed to get name")?,
                node_count: node_count.max(0) as u64,
                created_at: Self::parse_timestamp(&created_at_str)?,
            });
        }
        Ok(trees)
    }

    async fn count_trees_for_user(&self, user_id: &str) -> Result<u64> {
        let conn = self.connect_with_timeout().await?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM trees WHERE user_id = ?", [user_id])
            .await?;

        let count: i64 = match rows.next().await? {
            Some(row) => row.get(0).context("Failed to get count")?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }

    async fn list_flashcards_for_node(&self, node_id: i64) -> Result<Vec<Flashcard>> {
        let conn = self.connect_with_timeout().await?;
        let sql = format!(
            "SELECT {} FROM flashcards WHERE node_id = ? ORDER BY id ASC",
            FLASHCARD_COLUMNS
        );
        let mut rows = conn.query(&sql, [node_id]).await?;

        let mut cards = Vec::new();
        while let Some(row) = rows.next().await? {
            cards.push(Self::row_to_flashcard(&row)?);
        }
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    async fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = SqliteStore::new(db_path).await.unwrap();
        (store, temp_dir)
    }

    fn draft(question: &str) -> NodeDraft {
        NodeDraft {
            user_id: "u1".to_string(),
            question: question.to_string(),
            name: format!("{} name", question),
            content: "# Body".to_string(),
            followups: vec!["What next?".to_string()],
        }
    }

    fn new_tree(name: &str) -> NewTree {
        NewTree {
            name: name.to_string(),
            user_id: "u1".to_string(),
        }
    }

    fn card(keyword: &str) -> FlashcardDraft {
        FlashcardDraft {
            keyword: keyword.to_string(),
            definition: format!("{} means something", keyword),
        }
    }

    #[tokio::test]
    async fn test_new_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("learntree.db");
        let store = SqliteStore::new(db_path.clone()).await.unwrap();

        assert_eq!(store.db_path(), db_path.as_path());
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_tree_and_nodes_persist() {
        let (store, _temp_dir) = create_test_store().await;
        let (tree, root) = store
            .create_tree_with_root(new_tree("Rust"), draft("Rust"))
            .await
            .unwrap();
        let child = store
            .create_node(tree.id, root.id, draft("Ownership"))
            .await
            .unwrap();

        let found = store.find_node_by_id(child.id).await.unwrap().unwrap();
        assert_eq!(found.parent_id, Some(root.id));
        assert_eq!(found.followups, vec!["What next?".to_string()]);
        assert_eq!(found.created_at, child.created_at);

        let by_hash = store.find_tree_by_hash(&tree.hash).await.unwrap().unwrap();
        assert_eq!(by_hash.id, tree.id);

        let nodes = store.list_nodes_for_tree(tree.id).await.unwrap();
        let ids: Vec<i64> = nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![root.id, child.id]);
    }

    #[tokio::test]
    async fn test_missing_rows_are_none() {
        let (store, _temp_dir) = create_test_store().await;
        assert!(store.find_node_by_id(1).await.unwrap().is_none());
        assert!(store.find_tree_by_id(1).await.unwrap().is_none());
        assert!(store.find_tree_by_hash("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_node_rejects_foreign_parent() {
        let (store, _temp_dir) = create_test_store().await;
        let (_, root_a) = store
            .create_tree_with_root(new_tree("A"), draft("A"))
            .await
            .unwrap();
        let (tree_b, _) = store
            .create_tree_with_root(new_tree("B"), draft("B"))
            .await
            .unwrap();

        assert_err!(store.create_node(tree_b.id, root_a.id, draft("cross")).await);
        assert_err!(store.create_node(tree_b.id, 999, draft("orphan")).await);
        assert_eq!(store.list_nodes_for_tree(tree_b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_flashcard_batch_rolls_back() {
        let (store, _temp_dir) = create_test_store().await;
        let (_, root) = store
            .create_tree_with_root(new_tree("Rust"), draft("Rust"))
            .await
            .unwrap();

        // Second card violates the keyword CHECK constraint
        assert_err!(
            store
                .create_flashcards(root.id, "u1", vec![card("borrow"), card("")])
                .await
        );
        assert!(store.list_flashcards_for_node(root.id).await.unwrap().is_empty());

        let created = assert_ok!(
            store
                .create_flashcards(root.id, "u1", vec![card("borrow"), card("move")])
                .await
        );
        assert_eq!(created.len(), 2);

        let listed = store.list_flashcards_for_node(root.id).await.unwrap();
        let keywords: Vec<&str> = listed.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["borrow", "move"]);
    }

    #[tokio::test]
    async fn test_list_trees_pages_newest_first() {
        let (store, _temp_dir) = create_test_store().await;
        for name in ["one", "two", "three"] {
            store
                .create_tree_with_root(new_tree(name), draft(name))
                .await
                .unwrap();
        }

        let first_page = store.list_trees_for_user("u1", 2, 0).await.unwrap();
        let names: Vec<&str> = first_page.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["three", "two"]);
        assert!(first_page.iter().all(|t| t.node_count == 1));

        let second_page = store.list_trees_for_user("u1", 2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].name, "one");

        assert_eq!(store.count_trees_for_user("u1").await.unwrap(), 3);
        assert_eq!(store.count_trees_for_user("u2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let store = SqliteStore::new(db_path.clone()).await.unwrap();
        store
            .create_tree_with_root(new_tree("kept"), draft("kept"))
            .await
            .unwrap();
        drop(store);

        let reopened = SqliteStore::new(db_path).await.unwrap();
        assert_eq!(reopened.count_trees_for_user("u1").await.unwrap(), 1);
    }
}
