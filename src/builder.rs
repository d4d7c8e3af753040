//! Graph builder - one file's syntax tree to one scope-graph tree
//!
//! A structural recursion over syntax-node types. Two pieces of ambient
//! state drive it: the scope stack (open scopes, outermost first) and a
//! per-call [`Context`] saying what the recursion is being asked to
//! produce. The context is an immutable value passed down; type
//! resolution, which must report results back up, goes through
//! [`GraphBuilder::resolve_type`] instead of shared mutation.
//!
//! Types are resolved eagerly at declaration time whenever the named type
//! is already visible in an enclosing scope; everything else is deferred
//! to the cross-linker.

use crate::coord::Point;
use crate::cst::SyntaxNode;
use crate::node::{NodeArena, NodeId, NodeKind};

/// Syntax-node types the builder acts on. Everything else is transparent:
/// the builder recurses over its children unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CstKind {
    TranslationUnit,
    FunctionDefinition,
    CompoundStatement,
    /// `declaration`, `parameter_declaration`, `field_declaration`
    Declaration,
    StructSpecifier,
    EnumSpecifier,
    PreprocInclude,
    TypeIdentifier,
    Identifier,
    FieldIdentifier,
    /// Call, member-access, pointer-dereference, subscript expressions
    ReferenceExpr,
    Error,
    Other,
}

impl CstKind {
    fn of(node: &SyntaxNode) -> Self {
        match node.kind() {
            "translation_unit" => CstKind::TranslationUnit,
            "function_definition" => CstKind::FunctionDefinition,
            "compound_statement" => CstKind::CompoundStatement,
            "declaration" | "parameter_declaration" | "field_declaration" => CstKind::Declaration,
            "struct_specifier" => CstKind::StructSpecifier,
            "enum_specifier" => CstKind::EnumSpecifier,
            "preproc_include" => CstKind::PreprocInclude,
            "type_identifier" => CstKind::TypeIdentifier,
            "identifier" => CstKind::Identifier,
            "field_identifier" => CstKind::FieldIdentifier,
            "call_expression" | "field_expression" | "pointer_expression"
            | "subscript_expression" => CstKind::ReferenceExpr,
            "ERROR" => CstKind::Error,
            _ => CstKind::Other,
        }
    }
}

/// What a recursive build call is being asked to produce
#[derive(Debug, Clone, Default)]
enum Context {
    /// Ordinary statement/expression position
    #[default]
    Normal,
    /// Inside a declarator: every identifier becomes a SYMBOL carrying
    /// the declaration's resolved type
    Declaration {
        type_name: String,
        jump_to: Option<NodeId>,
    },
    /// Inside a function body whose scope is already open; compound
    /// statements do not open another one
    SkipBody,
}

/// Result of resolving the type part of a declaration in isolation
#[derive(Debug, Default)]
struct TypeSpec {
    name: String,
    jump_to: Option<NodeId>,
}

/// Build the scope graph for one translation unit.
///
/// Returns the root node (kind NAMED_SCOPE, named `translation_unit`), or
/// `None` when the input tree holds no translation unit at all.
pub fn build_graph(arena: &mut NodeArena, source: &str, root: SyntaxNode<'_>) -> Option<NodeId> {
    let mut builder = GraphBuilder {
        arena,
        source,
        stack: Vec::new(),
    };
    builder.walk(root, &Context::Normal);
    builder.stack.first().copied()
}

struct GraphBuilder<'a> {
    arena: &'a mut NodeArena,
    source: &'a str,
    stack: Vec<NodeId>,
}

impl GraphBuilder<'_> {
    fn walk(&mut self, node: SyntaxNode<'_>, ctx: &Context) {
        match CstKind::of(&node) {
            CstKind::TranslationUnit => {
                let root =
                    self.arena
                        .alloc(NodeKind::NamedScope, "translation_unit", node.position());
                self.arena.node_mut(root).type_name = "root".to_string();
                self.stack.push(root);
                for ch in node.children() {
                    self.walk(ch, ctx);
                }
                // The root stays on the stack; build_graph reads it back.
            }

            CstKind::FunctionDefinition => {
                let Some(scope) = self.open_scope(NodeKind::NamedScope, "", node.position())
                else {
                    return;
                };
                if let Some(declarator) = node.child_of_kind("function_declarator") {
                    if let Some(id) = declarator.child_of_kind("identifier") {
                        let name = id.text(self.source).to_string();
                        let scope_node = self.arena.node_mut(scope);
                        scope_node.name = name.clone();
                        scope_node.type_name = name;
                    }
                    if let Some(params) = declarator.child_of_kind("parameter_list") {
                        self.walk(params, &Context::Normal);
                    }
                }
                // The function's own scope doubles as its body's scope.
                if let Some(body) = node.child_of_kind("compound_statement") {
                    self.walk(body, &Context::SkipBody);
                }
                self.stack.pop();
            }

            CstKind::CompoundStatement => {
                if matches!(ctx, Context::SkipBody) {
                    for ch in node.children() {
                        self.walk(ch, ctx);
                    }
                } else {
                    if self
                        .open_scope(NodeKind::UnnamedScope, "", node.position())
                        .is_none()
                    {
                        return;
                    }
                    for ch in node.children() {
                        self.walk(ch, ctx);
                    }
                    self.stack.pop();
                }
            }

            CstKind::Declaration => {
                let spec = match node.child_by_field("type") {
                    Some(type_node) => self.resolve_type(type_node),
                    None => TypeSpec::default(),
                };
                let jump_to = spec.jump_to.or_else(|| self.lookup_scope_type(&spec.name));
                let ctx2 = Context::Declaration {
                    type_name: spec.name,
                    jump_to,
                };
                for declarator in node.children_by_field("declarator") {
                    self.walk(declarator, &ctx2);
                }
            }

            CstKind::StructSpecifier | CstKind::EnumSpecifier => {
                self.build_type_specifier(node, ctx);
            }

            CstKind::PreprocInclude => {
                if let Some(path_node) = node.child_by_field("path") {
                    let target = path_node
                        .text(self.source)
                        .trim_matches(|c| c == '"' || c == '<' || c == '>')
                        .to_string();
                    self.attach_leaf(NodeKind::Import, target, node.position());
                }
            }

            // Meaningful only in type position; resolve_type handles it.
            CstKind::TypeIdentifier => {}

            CstKind::Identifier | CstKind::FieldIdentifier => {
                if let Context::Declaration { type_name, jump_to } = ctx {
                    let name = node.text(self.source).to_string();
                    if let Some(sym) = self.attach_leaf(NodeKind::Symbol, name, node.position()) {
                        let sym_node = self.arena.node_mut(sym);
                        sym_node.type_name = type_name.clone();
                        sym_node.jump_to = *jump_to;
                    }
                } else if CstKind::of(&node) == CstKind::Identifier {
                    self.capture_reference(node);
                }
            }

            CstKind::ReferenceExpr => self.capture_reference(node),

            // Malformed syntax produces nothing.
            CstKind::Error => {}

            CstKind::Other => {
                for ch in node.children() {
                    self.walk(ch, ctx);
                }
            }
        }
    }

    /// Handle a struct/enum specifier: NAMED_SCOPE if it carries a name,
    /// UNNAMED_SCOPE otherwise. A specifier without a body is a forward
    /// reference: the node is reinterpreted as a SYMBOL and its type is
    /// looked up against the current scope stack.
    ///
    /// Returns the created node and the type name, for callers in type
    /// position.
    fn build_type_specifier(
        &mut self,
        node: SyntaxNode<'_>,
        ctx: &Context,
    ) -> Option<(NodeId, String)> {
        let name = node
            .child_by_field("name")
            .map(|n| n.text(self.source).to_string())
            .unwrap_or_default();
        let kind = if name.is_empty() {
            NodeKind::UnnamedScope
        } else {
            NodeKind::NamedScope
        };

        let scope = self.open_scope(kind, name.clone(), node.position())?;
        self.arena.node_mut(scope).type_name = name.clone();

        match node.child_by_field("body") {
            Some(body) => self.walk(body, ctx),
            None => {
                self.arena.node_mut(scope).kind = NodeKind::Symbol;
                let jump_to = self.lookup_scope_type(&name);
                self.arena.node_mut(scope).jump_to = jump_to;
            }
        }

        self.stack.pop();
        Some((scope, name))
    }

    /// Resolve the type part of a declaration in isolation.
    fn resolve_type(&mut self, node: SyntaxNode<'_>) -> TypeSpec {
        match CstKind::of(&node) {
            CstKind::TypeIdentifier => TypeSpec {
                name: node.text(self.source).to_string(),
                jump_to: None,
            },
            CstKind::StructSpecifier | CstKind::EnumSpecifier => {
                match self.build_type_specifier(node, &Context::Normal) {
                    Some((id, name)) => TypeSpec {
                        name,
                        jump_to: Some(id),
                    },
                    None => TypeSpec::default(),
                }
            }
            CstKind::Error => TypeSpec::default(),
            _ => {
                let mut spec = TypeSpec::default();
                for ch in node.children() {
                    let inner = self.resolve_type(ch);
                    if !inner.name.is_empty() || inner.jump_to.is_some() {
                        spec = inner;
                    }
                }
                spec
            }
        }
    }

    /// Search the scope stack, innermost first, for a NAMED_SCOPE child
    /// with the given type name. First match wins.
    fn lookup_scope_type(&self, type_name: &str) -> Option<NodeId> {
        if type_name.is_empty() {
            return None;
        }
        for &scope in self.stack.iter().rev() {
            for &ch in &self.arena.node(scope).children {
                let child = self.arena.node(ch);
                if child.kind == NodeKind::NamedScope && child.type_name == type_name {
                    return Some(ch);
                }
            }
        }
        None
    }

    /// Capture an expression as a REFERENCE node with a dot-joined path.
    fn capture_reference(&mut self, node: SyntaxNode<'_>) {
        if let Some(path) = self.flatten_reference(node) {
            if !path.is_empty() {
                self.attach_leaf(NodeKind::Reference, path, node.position());
            }
        }
    }

    /// Reduce a reference expression to a dot-joined qualified path:
    /// `org->emp.name` becomes `org.emp.name`, `f(x)[i]` becomes `f`.
    fn flatten_reference(&self, node: SyntaxNode<'_>) -> Option<String> {
        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" => {
                Some(node.text(self.source).to_string())
            }
            "call_expression" => node
                .child_by_field("function")
                .and_then(|f| self.flatten_reference(f)),
            "field_expression" => {
                let inner = node
                    .child_by_field("argument")
                    .and_then(|a| self.flatten_reference(a))?;
                let field = node
                    .child_by_field("field")
                    .and_then(|f| self.flatten_reference(f))?;
                Some(format!("{}.{}", inner, field))
            }
            "pointer_expression" | "subscript_expression" => node
                .child_by_field("argument")
                .and_then(|a| self.flatten_reference(a)),
            _ => None,
        }
    }

    fn open_scope(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        location: Point,
    ) -> Option<NodeId> {
        let &top = self.stack.last()?;
        let id = self.arena.alloc(kind, name, location);
        self.arena.attach(top, id);
        self.stack.push(id);
        Some(id)
    }

    fn attach_leaf(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        location: Point,
    ) -> Option<NodeId> {
        let &top = self.stack.last()?;
        let id = self.arena.alloc(kind, name, location);
        self.arena.attach(top, id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Point;
    use crate::cst::CParser;

    fn build(source: &str) -> (NodeArena, NodeId) {
        let mut parser = CParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let mut arena = NodeArena::new();
        let root = build_graph(&mut arena, source, tree.root()).unwrap();
        (arena, root)
    }

    fn child_named(arena: &NodeArena, scope: NodeId, name: &str) -> NodeId {
        arena.find_child(scope, name).unwrap()
    }

    #[test]
    fn test_local_type_resolved_at_build_time() {
        let source = "struct Employee {\n    int id;\n};\n\nstruct Employee emp;\n";
        let (arena, root) = build(source);

        let employee = child_named(&arena, root, "Employee");
        assert_eq!(arena.node(employee).kind, NodeKind::NamedScope);

        // `struct Employee emp;` declares emp through a forward-reference
        // SYMBOL that already jumps to the definition.
        let emp = child_named(&arena, root, "emp");
        assert_eq!(arena.node(emp).kind, NodeKind::Symbol);
        assert_eq!(arena.node(emp).type_name, "Employee");

        let via = arena.node(emp).jump_to.expect("emp should link at build time");
        assert_eq!(arena.node(via).kind, NodeKind::Symbol);
        assert_eq!(arena.node(via).jump_to, Some(employee));
    }

    #[test]
    fn test_inline_struct_links_directly() {
        let source = "struct Point {\n    int x;\n} origin;\n";
        let (arena, root) = build(source);

        let point = child_named(&arena, root, "Point");
        let origin = child_named(&arena, root, "origin");
        assert_eq!(arena.node(origin).jump_to, Some(point));
        assert_eq!(arena.node(origin).type_name, "Point");
    }

    #[test]
    fn test_unnamed_struct_scope() {
        let source = "struct {\n    int x;\n} s;\n";
        let (arena, root) = build(source);

        let children = &arena.node(root).children;
        let unnamed = children
            .iter()
            .copied()
            .find(|&id| arena.node(id).kind == NodeKind::UnnamedScope)
            .unwrap();
        assert!(arena.find_child(unnamed, "x").is_some());

        let s = child_named(&arena, root, "s");
        assert_eq!(arena.node(s).jump_to, Some(unnamed));
    }

    #[test]
    fn test_function_scope_owns_params_and_body() {
        let source = "int add(int a, int b) {\n    int sum;\n    return sum;\n}\n";
        let (arena, root) = build(source);

        let add = child_named(&arena, root, "add");
        assert_eq!(arena.node(add).kind, NodeKind::NamedScope);
        assert_eq!(arena.node(add).type_name, "add");

        // Parameters and body locals share the function scope; the body
        // does not open a second block scope.
        assert!(arena.find_child(add, "a").is_some());
        assert!(arena.find_child(add, "b").is_some());
        assert!(arena.find_child(add, "sum").is_some());
        assert!(
            arena
                .node(add)
                .children
                .iter()
                .all(|&ch| arena.node(ch).kind != NodeKind::UnnamedScope)
        );
    }

    #[test]
    fn test_reference_paths_flattened() {
        let source = "int main() {\n    org.emp.name;\n    org->emp;\n    f(x)[2];\n}\n";
        let (arena, root) = build(source);

        let main = child_named(&arena, root, "main");
        let refs: Vec<&str> = arena
            .node(main)
            .children
            .iter()
            .filter(|&&ch| arena.node(ch).kind == NodeKind::Reference)
            .map(|&ch| arena.node(ch).name.as_str())
            .collect();

        assert_eq!(refs, vec!["org.emp.name", "org.emp", "f"]);
    }

    #[test]
    fn test_reference_location_is_expression_start() {
        let source = "int main() {\n    org.emp.name;\n}\n";
        let (arena, root) = build(source);

        let main = child_named(&arena, root, "main");
        let reference = child_named(&arena, main, "org.emp.name");
        assert_eq!(arena.node(reference).location, Point::new(1, 4));
    }

    #[test]
    fn test_import_node_strips_quotes() {
        let source = "#include \"def1.h\"\n#include <stdio.h>\n";
        let (arena, root) = build(source);

        let imports: Vec<&str> = arena
            .node(root)
            .children
            .iter()
            .filter(|&&ch| arena.node(ch).kind == NodeKind::Import)
            .map(|&ch| arena.node(ch).name.as_str())
            .collect();
        assert_eq!(imports, vec!["def1.h", "stdio.h"]);
    }

    #[test]
    fn test_forward_reference_without_definition_stays_unlinked() {
        let source = "struct Missing m;\n";
        let (arena, root) = build(source);

        let m = child_named(&arena, root, "m");
        let via = arena.node(m).jump_to.unwrap();
        assert_eq!(arena.node(via).name, "Missing");
        assert_eq!(arena.node(via).kind, NodeKind::Symbol);
        // Left for the cross-linker.
        assert_eq!(arena.node(via).jump_to, None);
    }

    #[test]
    fn test_comma_declarations() {
        let source = "int main() {\n    int x, y;\n}\n";
        let (arena, root) = build(source);

        let main = child_named(&arena, root, "main");
        assert!(arena.find_child(main, "x").is_some());
        assert!(arena.find_child(main, "y").is_some());
    }

    #[test]
    fn test_enum_members() {
        let source = "enum Color {\n    RED,\n    GREEN\n};\n";
        let (arena, root) = build(source);

        let color = child_named(&arena, root, "Color");
        assert_eq!(arena.node(color).kind, NodeKind::NamedScope);
        assert!(arena.find_child(color, "RED").is_some());
        assert!(arena.find_child(color, "GREEN").is_some());
    }

    #[test]
    fn test_empty_input_still_has_root() {
        let (arena, root) = build("");
        assert_eq!(arena.node(root).name, "translation_unit");
        assert!(arena.node(root).children.is_empty());
    }
}
