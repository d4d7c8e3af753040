//! Concrete syntax tree input
//!
//! Thin wrapper around the Tree-sitter C grammar. The graph builder only
//! needs four things per syntax node: its type name, its ordered children
//! (plus named-field access), its start position, and its source text;
//! this module is the whole parsing surface.

use crate::coord::Point;
use crate::{Error, Result};
use tree_sitter::{Parser, Tree};

/// A parsed C source file
pub struct SyntaxTree {
    tree: Tree,
}

impl SyntaxTree {
    /// The root `translation_unit` node
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            inner: self.tree.root_node(),
        }
    }
}

/// One node of a parsed syntax tree
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    inner: tree_sitter::Node<'t>,
}

impl<'t> SyntaxNode<'t> {
    /// Grammar type name of this node (e.g. `"struct_specifier"`)
    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    /// Whether the parser flagged this node as malformed
    pub fn is_error(&self) -> bool {
        self.inner.is_error()
    }

    /// All children in source order, anonymous tokens included
    pub fn children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.inner.walk();
        self.inner
            .children(&mut cursor)
            .map(|inner| SyntaxNode { inner })
            .collect()
    }

    /// First child with the given grammar type name, if any
    pub fn child_of_kind(&self, kind: &str) -> Option<SyntaxNode<'t>> {
        self.children().into_iter().find(|ch| ch.kind() == kind)
    }

    /// Child stored under a named grammar field
    pub fn child_by_field(&self, field: &str) -> Option<SyntaxNode<'t>> {
        self.inner
            .child_by_field_name(field)
            .map(|inner| SyntaxNode { inner })
    }

    /// All children stored under a named grammar field, in source order
    pub fn children_by_field(&self, field: &str) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.inner.walk();
        self.inner
            .children_by_field_name(field, &mut cursor)
            .map(|inner| SyntaxNode { inner })
            .collect()
    }

    /// Source text of this node
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.inner.start_byte()..self.inner.end_byte()]
    }

    /// Start position (0-indexed line and column)
    pub fn position(&self) -> Point {
        let p = self.inner.start_position();
        Point::new(p.row as u32, p.column as u32)
    }
}

/// Parser handle for the bundled C grammar
pub struct CParser {
    parser: Parser,
}

impl CParser {
    /// Create a parser with the C grammar loaded
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(|e| Error::Parser(format!("Failed to set language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse one file's contents
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::Parser("Failed to parse source".to_string()))?;
        Ok(SyntaxTree { tree })
    }
}
