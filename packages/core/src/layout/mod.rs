//! Tree layout
//!
//! Derives display positions and parent-child edges from flat node rows. Layouts are
//! computed on demand and never persisted.

mod engine;
mod types;

pub use engine::{LayoutEngine, LayoutError};
pub use types::{
    FlowEdge, FlowLayout, LayoutConfig, LayoutItem, LayoutStrategy, Position, PositionedNode,
};
