//! Tree and flashcard records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node::{Node, ValidationError};

/// Maximum tree name length (characters)
pub const MAX_TREE_NAME_LENGTH: usize = 100;

/// Default page size when listing trees
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page size accepted when listing trees
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A named collection of nodes owned by one user
///
/// `id` is used for relational joins; `hash` is the opaque external address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub id: i64,
    pub hash: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTree {
    pub name: String,
    pub user_id: String,
}

impl NewTree {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        let length = self.name.chars().count();
        if length > MAX_TREE_NAME_LENGTH {
            return Err(ValidationError::TooLong {
                field: "name".to_string(),
                length,
                max: MAX_TREE_NAME_LENGTH,
            });
        }
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()));
        }
        Ok(())
    }
}

/// Generate a fresh external tree address
pub fn new_tree_hash() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Tree listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSummary {
    pub id: i64,
    pub hash: String,
    pub name: String,
    pub node_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: u64, limit: u32, offset: u32) -> Self {
        Self {
            total,
            limit,
            offset,
            has_more: (offset as u64 + limit as u64) < total,
        }
    }
}

/// One page of a user's trees, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePage {
    pub trees: Vec<TreeSummary>,
    pub pagination: Pagination,
}

/// A tree together with its full node list (oldest first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeWithNodes {
    pub tree: Tree,
    pub nodes: Vec<Node>,
}

/// A keyword/definition pair attached to one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: i64,
    pub node_id: i64,
    pub user_id: String,
    pub keyword: String,
    pub definition: String,
    pub created_at: DateTime<Utc>,
}

/// Unpersisted flashcard content, as produced by generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDraft {
    pub keyword: String,
    pub definition: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_has_more() {
        assert!(Pagination::new(25, 10, 0).has_more);
        assert!(Pagination::new(25, 10, 10).has_more);
        assert!(!Pagination::new(25, 10, 20).has_more);
        assert!(!Pagination::new(0, 10, 0).has_more);
        assert!(!Pagination::new(10, 10, 0).has_more);
    }

    #[test]
    fn test_new_tree_validation() {
        let ok = NewTree {
            name: "Rust".to_string(),
            user_id: "u1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank = NewTree {
            name: " ".to_string(),
            ..ok.clone()
        };
        assert!(blank.validate().is_err());

        let long = NewTree {
            name: "n".repeat(MAX_TREE_NAME_LENGTH + 1),
            ..ok
        };
        assert!(matches!(
            long.validate(),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_tree_hashes_are_unique() {
        let a = new_tree_hash();
        let b = new_tree_hash();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
