//! Usage engine - where else is this definition used?
//!
//! Two linear scans over the coordinate index, depending on what the
//! queried coordinate addresses:
//! - a NAMED_SCOPE (type definition): every SYMBOL whose `jump_to` is
//!   that definition;
//! - a SYMBOL: every REFERENCE whose dot-joined path contains the
//!   symbol's name as one of its segments. Purely syntactic; unrelated
//!   same-named symbols in other scopes over-report.
//!
//! Result order follows index iteration and is unspecified.

use crate::coord::Coordinate;
use crate::index::CoordinateIndex;
use crate::node::{NodeArena, NodeId, NodeKind};

/// Find every usage of the definition or declaration at `coord`.
///
/// Returns an empty list when the coordinate is not indexed or not
/// usage-trackable (references, imports, unnamed scopes).
pub fn find_usages(
    arena: &NodeArena,
    index: &CoordinateIndex,
    coord: &Coordinate,
) -> Vec<Coordinate> {
    let Some(target) = index.get(coord) else {
        return Vec::new();
    };

    match arena.node(target).kind {
        NodeKind::NamedScope => index
            .iter()
            .filter(|&(_, id)| {
                let node = arena.node(id);
                node.kind == NodeKind::Symbol && node.jump_to == Some(target)
            })
            .map(|(_, id)| owning_coordinate(arena, id))
            .collect(),
        NodeKind::Symbol => {
            let name = arena.node(target).name.as_str();
            index
                .iter()
                .filter(|&(_, id)| {
                    let node = arena.node(id);
                    node.kind == NodeKind::Reference
                        && node.name.split('.').any(|segment| segment == name)
                })
                .map(|(_, id)| owning_coordinate(arena, id))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// A node's location under its owning file (the tree root's name)
fn owning_coordinate(arena: &NodeArena, id: NodeId) -> Coordinate {
    let root = arena.owning_root(id);
    Coordinate::at(arena.node(root).name.clone(), arena.node(id).location)
}
