//! Coordinate index - position-keyed lookup over every loaded tree
//!
//! Flattens scope-graph trees into a `(file, line, column)` → node table
//! by full pre-order traversal. Populated incrementally as files load and
//! rebuilt wholesale on reload; entries are never removed one by one.

use crate::coord::Coordinate;
use crate::node::{NodeArena, NodeId};
use std::collections::HashMap;

/// Mapping from [`Coordinate`] to node, one entry per indexed node.
///
/// When two nodes of one file share a start position (the file root and a
/// construct at offset zero, say), the later pre-order entry wins.
#[derive(Debug, Default)]
pub struct CoordinateIndex {
    table: HashMap<Coordinate, NodeId>,
}

impl CoordinateIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every node of the tree rooted at `root` under `path`
    pub fn add_tree(&mut self, arena: &NodeArena, path: &str, root: NodeId) {
        arena.walk(root, &mut |id, node| {
            self.table
                .insert(Coordinate::at(path, node.location), id);
        });
    }

    /// Look up the node at a coordinate
    pub fn get(&self, coord: &Coordinate) -> Option<NodeId> {
        self.table.get(coord).copied()
    }

    /// Iterate all indexed nodes
    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, NodeId)> {
        self.table.iter().map(|(c, &id)| (c, id))
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Drop all entries (before a full rebuild)
    pub fn clear(&mut self) {
        self.table.clear();
    }
}
