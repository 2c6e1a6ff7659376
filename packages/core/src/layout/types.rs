//! Layout input and output types

use crate::models::Node;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything that can be placed in a tree layout
///
/// Items are flat parent-pointer rows; the engine rebuilds the hierarchy per call.
pub trait LayoutItem {
    fn layout_id(&self) -> i64;
    fn layout_parent_id(&self) -> Option<i64>;
    fn layout_created_at(&self) -> DateTime<Utc>;
}

impl LayoutItem for Node {
    fn layout_id(&self) -> i64 {
        self.id
    }

    fn layout_parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn layout_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Which layout contract runs when a node is added to a displayed tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutStrategy {
    /// Recompute the whole layout from all nodes
    #[default]
    FullRecompute,

    /// Place the new node beside its siblings without re-balancing
    IncrementalAppend,
}

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Distance between adjacent leaves
    pub horizontal_spacing: f64,

    /// Distance between generations
    pub vertical_spacing: f64,

    pub strategy: LayoutStrategy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 100.0,
            vertical_spacing: 100.0,
            strategy: LayoutStrategy::FullRecompute,
        }
    }
}

impl LayoutConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.horizontal_spacing.is_finite() || self.horizontal_spacing <= 0.0 {
            return Err(format!(
                "horizontal_spacing must be a positive number, got {}",
                self.horizontal_spacing
            ));
        }
        if !self.vertical_spacing.is_finite() || self.vertical_spacing <= 0.0 {
            return Err(format!(
                "vertical_spacing must be a positive number, got {}",
                self.vertical_spacing
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One placed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode<T> {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub position: Position,
    pub data: T,
}

/// Parent-to-child connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// `"<parent>-<child>"`
    pub id: String,
    pub source: i64,
    pub target: i64,
}

impl FlowEdge {
    pub fn new(source: i64, target: i64) -> Self {
        Self {
            id: format!("{}-{}", source, target),
            source,
            target,
        }
    }
}

/// Positioned nodes plus edges, derived on demand and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLayout<T> {
    pub nodes: Vec<PositionedNode<T>>,
    pub edges: Vec<FlowEdge>,
}

impl<T> Default for FlowLayout<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl<T> FlowLayout<T> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn position_of(&self, id: i64) -> Option<Position> {
        self.nodes.iter().find(|n| n.id == id).map(|n| n.position)
    }
}
