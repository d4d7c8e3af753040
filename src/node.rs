//! Scope-graph node model
//!
//! Every translation unit becomes a tree of nodes of five kinds:
//! - `NamedScope`: the file root, a named struct/enum, a function
//! - `UnnamedScope`: an anonymous struct/enum or a bare block
//! - `Symbol`: a declared name (variable, parameter, field, type reference)
//! - `Reference`: a use site, carrying a dot-joined qualified path
//! - `Import`: an `#include` directive, carrying the included path text
//!
//! Nodes live in a [`NodeArena`]; `children` own the tree shape while
//! `parent` and `jump_to` are non-owning ids, so cross-file resolution
//! edges never create ownership cycles.

use crate::coord::Point;
use std::fmt::Write as _;

/// The kind of a scope-graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A scope with a name: file root, named struct/enum, function
    NamedScope,
    /// A declared name pointing (via `jump_to`) at what it denotes
    Symbol,
    /// A use site with a dot-joined qualified path
    Reference,
    /// A scope without a name: anonymous struct/enum, bare block
    UnnamedScope,
    /// An `#include` directive
    Import,
}

impl NodeKind {
    /// Get the string representation of the node kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::NamedScope => "NAMED_SCOPE",
            NodeKind::Symbol => "SYMBOL",
            NodeKind::Reference => "REFERENCE",
            NodeKind::UnnamedScope => "UNNAMED_SCOPE",
            NodeKind::Import => "IMPORT",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of a node within its [`NodeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of a scope graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node kind
    pub kind: NodeKind,
    /// Declared identifier, dot-joined reference path, or import target.
    /// For a translation-unit root this is overwritten with the file's
    /// absolute path after building.
    pub name: String,
    /// Type name resolved at build time; empty when unknown. Scopes carry
    /// their own name here so type lookup can match them.
    pub type_name: String,
    /// Start position of the originating syntax node
    pub location: Point,
    /// The node this one denotes or resolves to; `None` until known. May
    /// point into a different file's tree after cross-linking.
    pub jump_to: Option<NodeId>,
    /// Enclosing scope; `None` at a tree root
    pub parent: Option<NodeId>,
    /// Owned children, in source order
    pub children: Vec<NodeId>,
}

/// Arena holding every node of every loaded translation unit.
///
/// Tree shape is exclusive (each node has at most one parent); `jump_to`
/// edges are plain ids and carry no ownership.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new detached node
    pub fn alloc(&mut self, kind: NodeKind, name: impl Into<String>, location: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            name: name.into(),
            type_name: String::new(),
            location,
            jump_to: None,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Attach `child` under `parent`, recording the back-reference
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Number of nodes ever allocated
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct child of `scope` whose name matches, if any
    pub fn find_child(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        self.node(scope)
            .children
            .iter()
            .copied()
            .find(|&ch| self.node(ch).name == name)
    }

    /// Search `start` and each enclosing scope, innermost first, for a
    /// direct child whose name matches.
    pub fn find_in_scope_chain(&self, start: NodeId, name: &str) -> Option<NodeId> {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            if let Some(found) = self.find_child(id, name) {
                return Some(found);
            }
            cursor = self.node(id).parent;
        }
        None
    }

    /// Walk `parent` links up to the tree root
    pub fn owning_root(&self, id: NodeId) -> NodeId {
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            cursor = parent;
        }
        cursor
    }

    /// Pre-order traversal of the tree rooted at `root`
    pub fn walk(&self, root: NodeId, visit: &mut dyn FnMut(NodeId, &Node)) {
        let node = self.node(root);
        visit(root, node);
        for &ch in &node.children {
            self.walk(ch, visit);
        }
    }

    /// Pre-order list of nodes under `root` matching a predicate
    pub fn collect(&self, root: NodeId, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(root, &mut |id, node| {
            if pred(node) {
                out.push(id);
            }
        });
        out
    }

    /// Render the tree rooted at `root` as indented `|-KIND[name]` rows,
    /// with `~> type` marking resolved jump edges.
    pub fn render(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.render_into(&mut out, root, 0);
        out
    }

    fn render_into(&self, out: &mut String, id: NodeId, level: usize) {
        let node = self.node(id);
        for _ in 0..level {
            out.push_str("|  ");
        }
        let _ = write!(out, "|-{}[{}]", node.kind, node.name);
        if let Some(target) = node.jump_to {
            let _ = write!(out, "~> {}", self.node(target).type_name);
        }
        out.push('\n');

        for &ch in &node.children {
            self.render_into(out, ch, level + 1);
        }
    }
}
