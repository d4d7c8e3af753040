//! Resolution engine - walks a reference chain to its definition
//!
//! A small stack machine over a dot-joined name stack:
//! 1. Empty stack: success; report the current node's owning file and
//!    location.
//! 2. At a REFERENCE: pop a segment and search outward through enclosing
//!    scopes for a direct child with that name.
//! 3. At a SYMBOL: follow `jump_to` without popping.
//! 4. At a NAMED_SCOPE: pop a segment and search that scope's direct
//!    children only.
//! Any dead end is NotFound, never an error.

use crate::coord::Coordinate;
use crate::index::CoordinateIndex;
use crate::node::{NodeArena, NodeKind};
use std::collections::VecDeque;

/// Resolve the name at `coord` to the coordinate of its definition.
///
/// Returns `None` when the coordinate is not indexed, when it addresses a
/// scope (scopes are not directly resolvable), or when the lookup chain
/// breaks.
pub fn resolve(arena: &NodeArena, index: &CoordinateIndex, coord: &Coordinate) -> Option<Coordinate> {
    let start = index.get(coord)?;

    if arena.node(start).kind == NodeKind::NamedScope {
        return None;
    }

    let name = &arena.node(start).name;
    let mut stack: VecDeque<String> = if name.is_empty() {
        VecDeque::new()
    } else {
        name.split('.').map(str::to_string).collect()
    };
    let mut current = start;

    while !stack.is_empty() {
        match arena.node(current).kind {
            NodeKind::Reference => {
                let segment = stack.pop_front()?;
                current = arena.find_in_scope_chain(current, &segment)?;
            }
            NodeKind::Symbol => {
                current = arena.node(current).jump_to?;
            }
            NodeKind::NamedScope => {
                let segment = stack.pop_front()?;
                current = arena.find_child(current, &segment)?;
            }
            // A chain never meaningfully lands on these.
            NodeKind::UnnamedScope | NodeKind::Import => return None,
        }
    }

    let root = arena.owning_root(current);
    Some(Coordinate::at(
        arena.node(root).name.clone(),
        arena.node(current).location,
    ))
}
