//! Tree layout engine
//!
//! Two contracts over the same output type:
//!
//! - [`LayoutEngine::layout`] computes positions for a whole tree. Leaves are spread
//!   left to right one slot apart; each parent sits at the midpoint of its first and last
//!   child. Generations move up by `vertical_spacing` (`y = -depth * v`).
//! - [`LayoutEngine::insert`] places one new node next to its existing siblings
//!   (`x = parent.x + siblings * h`, `y = parent.y + v`) and never re-balances.
//!
//! The two produce different coordinate conventions and must not be mixed on one layout.
//! [`LayoutEngine::apply_insert`] runs whichever one the configured
//! [`LayoutStrategy`] selects.

use crate::layout::types::{
    FlowEdge, FlowLayout, LayoutConfig, LayoutItem, LayoutStrategy, Position, PositionedNode,
};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("No root node found")]
    NoRootFound,

    #[error("Parent node {parent_id} is not positioned")]
    ParentNotPositioned { parent_id: i64 },

    #[error("Layout already has a root; cannot insert parentless node {id}")]
    RootAlreadyPositioned { id: i64 },
}

/// Per-call traversal state: input items indexed by parent
struct Arena<'a, T> {
    items: &'a [T],
    children: HashMap<i64, Vec<usize>>,
    positions: Vec<Option<Position>>,
    visit_order: Vec<usize>,
    edges: Vec<FlowEdge>,
    cursor: f64,
}

/// One node being placed: which child to descend into next and the x range seen so far
struct Frame {
    index: usize,
    depth: usize,
    next_child: usize,
    first_x: Option<f64>,
    last_x: Option<f64>,
}

fn enter<T>(arena: &mut Arena<'_, T>, index: usize, depth: usize) -> Frame {
    arena.visit_order.push(index);
    // Mark before descending so malformed input with repeated ids cannot loop
    arena.positions[index] = Some(Position::default());
    Frame {
        index,
        depth,
        next_child: 0,
        first_x: None,
        last_x: None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Full layout; a missing root yields an empty layout
    pub fn layout<T: LayoutItem + Clone>(&self, items: &[T]) -> FlowLayout<T> {
        match self.try_layout(items) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!("Returning empty layout for {} items: {}", items.len(), e);
                FlowLayout::default()
            }
        }
    }

    /// Full layout, reporting a missing root as an error
    pub fn try_layout<T: LayoutItem + Clone>(
        &self,
        items: &[T],
    ) -> Result<FlowLayout<T>, LayoutError> {
        if items.is_empty() {
            return Ok(FlowLayout::default());
        }

        let mut roots = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.layout_parent_id().is_none())
            .map(|(index, _)| index);
        let root = roots.next().ok_or(LayoutError::NoRootFound)?;
        let extra_roots = roots.count();
        if extra_roots > 0 {
            tracing::warn!(
                "{} additional parentless nodes ignored; using node {} as root",
                extra_roots,
                items[root].layout_id()
            );
        }

        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        for (index, item) in items.iter().enumerate() {
            if let Some(parent_id) = item.layout_parent_id() {
                children.entry(parent_id).or_default().push(index);
            }
        }
        // Stable: equal timestamps keep input order
        for siblings in children.values_mut() {
            siblings.sort_by_key(|&index| items[index].layout_created_at());
        }

        let mut arena = Arena {
            items,
            children,
            positions: vec![None; items.len()],
            visit_order: Vec::with_capacity(items.len()),
            edges: Vec::with_capacity(items.len().saturating_sub(1)),
            cursor: 0.0,
        };
        self.place(&mut arena, root);

        let orphans = items.len() - arena.visit_order.len();
        if orphans > 0 {
            tracing::warn!("{} nodes are not reachable from the root and were omitted", orphans);
        }

        let nodes = arena
            .visit_order
            .iter()
            .filter_map(|&index| {
                arena.positions[index].map(|position| PositionedNode {
                    id: items[index].layout_id(),
                    parent_id: items[index].layout_parent_id(),
                    position,
                    data: items[index].clone(),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            nodes = nodes.len(),
            edges = arena.edges.len(),
            "Computed full layout"
        );
        Ok(FlowLayout {
            nodes,
            edges: arena.edges,
        })
    }

    /// Post-order placement with an explicit stack, so depth is bounded by memory
    fn place<T: LayoutItem>(&self, arena: &mut Arena<'_, T>, root: usize) {
        let mut stack = vec![enter(arena, root, 0)];

        while let Some(frame) = stack.last_mut() {
            let id = arena.items[frame.index].layout_id();
            let next = arena
                .children
                .get(&id)
                .and_then(|children| children.get(frame.next_child))
                .copied();

            if let Some(child) = next {
                frame.next_child += 1;
                if arena.positions[child].is_some() {
                    continue;
                }
                let depth = frame.depth + 1;
                arena
                    .edges
                    .push(FlowEdge::new(id, arena.items[child].layout_id()));
                stack.push(enter(arena, child, depth));
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let x = match (done.first_x, done.last_x) {
                (Some(first), Some(last)) => (first + last) / 2.0,
                _ => {
                    let x = arena.cursor * self.config.horizontal_spacing;
                    arena.cursor += 1.0;
                    x
                }
            };
            let y = -(done.depth as f64) * self.config.vertical_spacing;
            arena.positions[done.index] = Some(Position { x, y });

            if let Some(parent) = stack.last_mut() {
                parent.first_x.get_or_insert(x);
                parent.last_x = Some(x);
            }
        }
    }

    /// Place one new node beside its positioned siblings
    ///
    /// Leaves `layout` untouched on error.
    pub fn insert<T: LayoutItem>(
        &self,
        layout: &mut FlowLayout<T>,
        new: T,
    ) -> Result<(), LayoutError> {
        let id = new.layout_id();
        let Some(parent_id) = new.layout_parent_id() else {
            if !layout.is_empty() {
                return Err(LayoutError::RootAlreadyPositioned { id });
            }
            layout.nodes.push(PositionedNode {
                id,
                parent_id: None,
                position: Position::default(),
                data: new,
            });
            return Ok(());
        };

        let parent = layout
            .position_of(parent_id)
            .ok_or(LayoutError::ParentNotPositioned { parent_id })?;
        let siblings = layout
            .nodes
            .iter()
            .filter(|n| n.parent_id == Some(parent_id))
            .count();

        let position = Position {
            x: parent.x + siblings as f64 * self.config.horizontal_spacing,
            y: parent.y + self.config.vertical_spacing,
        };
        tracing::debug!(id, parent_id, siblings, "Appended node to layout");

        layout.nodes.push(PositionedNode {
            id,
            parent_id: Some(parent_id),
            position,
            data: new,
        });
        layout.edges.push(FlowEdge::new(parent_id, id));
        Ok(())
    }

    /// Update a displayed layout after `new` was created, per the configured strategy
    ///
    /// `all_nodes` must already contain `new`; it is only read by `FullRecompute`.
    pub fn apply_insert<T: LayoutItem + Clone>(
        &self,
        layout: &mut FlowLayout<T>,
        all_nodes: &[T],
        new: T,
    ) -> Result<(), LayoutError> {
        match self.config.strategy {
            LayoutStrategy::FullRecompute => {
                *layout = self.try_layout(all_nodes)?;
                Ok(())
            }
            LayoutStrategy::IncrementalAppend => self.insert(layout, new),
        }
    }
}
