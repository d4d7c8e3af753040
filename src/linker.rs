//! Cross-linking engine - dependency-ordered export propagation
//!
//! After all files of a project are loaded, one pass recomputes every
//! `jump_to` link that depends on a type defined in another file:
//! 1. Rebuild the header-to-companion-source map (`x.h` declared here,
//!    defined in the `x.c` that includes it).
//! 2. Depth-first visit every unit, recursing into resolved imports
//!    first, accumulating a transitive export table per unit (imports in
//!    order, then own definitions, then the companion's; later entries
//!    win on name collision).
//! 3. Link every SYMBOL whose resolved type name appears in the table,
//!    recording a cross-link for each.
//!
//! The pass is idempotent: all working maps are rebuilt from scratch each
//! run. Unresolved imports and unmatched type names contribute nothing
//! and raise nothing.

use crate::filter::{COMPILED_SOURCE, HEADER_SHAPE};
use crate::node::{NodeArena, NodeId, NodeKind};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// A resolved symbol-to-definition edge recorded during the last pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossLink {
    /// The SYMBOL node whose `jump_to` was set
    pub symbol: NodeId,
    /// The NAMED_SCOPE definition it now points at
    pub definition: NodeId,
}

/// Summary of one cross-link pass
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct LinkerStats {
    /// Translation units visited
    pub units: usize,
    /// Cross-links recorded
    pub links: usize,
}

impl fmt::Display for LinkerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cross-Linker Stats:")?;
        writeln!(f, "  Units visited: {}", self.units)?;
        write!(f, "  Links recorded: {}", self.links)
    }
}

/// Everything one pass produces
pub struct LinkOutcome {
    pub cross_links: Vec<CrossLink>,
    pub header_to_source: HashMap<String, String>,
    pub stats: LinkerStats,
}

/// Pre-order IMPORT node targets of a unit
pub fn imports_of(arena: &NodeArena, root: NodeId) -> Vec<String> {
    arena
        .collect(root, |node| node.kind == NodeKind::Import)
        .into_iter()
        .map(|id| arena.node(id).name.clone())
        .collect()
}

/// Direct NAMED_SCOPE children of a unit root - its exported definitions
pub fn exported_definitions(arena: &NodeArena, root: NodeId) -> Vec<NodeId> {
    arena
        .node(root)
        .children
        .iter()
        .copied()
        .filter(|&ch| arena.node(ch).kind == NodeKind::NamedScope)
        .collect()
}

/// Pre-order SYMBOL nodes of a unit
pub fn symbols_of(arena: &NodeArena, root: NodeId) -> Vec<NodeId> {
    arena.collect(root, |node| node.kind == NodeKind::Symbol)
}

/// Match an import's text against the loaded working set: candidates
/// share the import's basename, and the first whose absolute path
/// contains the import text as a substring wins. Best-effort and
/// ambiguous among same-named headers in different directories.
pub fn resolve_import(
    name_to_path: &HashMap<String, Vec<String>>,
    import: &str,
) -> Option<String> {
    let file = Path::new(import).file_name()?.to_str()?;
    let candidates = name_to_path.get(file)?;
    candidates.iter().find(|path| path.contains(import)).cloned()
}

/// One cross-link pass over a set of loaded translation units
pub struct CrossLinker<'a> {
    arena: &'a mut NodeArena,
    units: &'a HashMap<String, NodeId>,
    name_to_path: &'a HashMap<String, Vec<String>>,
}

impl<'a> CrossLinker<'a> {
    pub fn new(
        arena: &'a mut NodeArena,
        units: &'a HashMap<String, NodeId>,
        name_to_path: &'a HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            arena,
            units,
            name_to_path,
        }
    }

    pub fn run(mut self) -> LinkOutcome {
        let header_to_source = self.build_companion_map();

        let mut cache: HashMap<String, HashMap<String, NodeId>> = HashMap::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut cross_links: Vec<CrossLink> = Vec::new();

        let unit_paths: Vec<String> = self.units.keys().cloned().collect();
        for path in &unit_paths {
            self.visit(
                path,
                &header_to_source,
                &mut cache,
                &mut visited,
                &mut cross_links,
            );
        }

        let stats = LinkerStats {
            units: visited.len(),
            links: cross_links.len(),
        };
        LinkOutcome {
            cross_links,
            header_to_source,
            stats,
        }
    }

    /// For every compiled source, map each header-shaped import it
    /// resolves back to this unit.
    fn build_companion_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for (path, &root) in self.units {
            let file_name = Path::new(path)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("");
            if !COMPILED_SOURCE.is_match(file_name) {
                continue;
            }
            for import in imports_of(self.arena, root) {
                if !HEADER_SHAPE.is_match(&import) {
                    continue;
                }
                if let Some(resolved) = resolve_import(self.name_to_path, &import) {
                    map.insert(resolved, path.clone());
                }
            }
        }
        map
    }

    fn visit(
        &mut self,
        unit: &str,
        header_to_source: &HashMap<String, String>,
        cache: &mut HashMap<String, HashMap<String, NodeId>>,
        visited: &mut HashSet<String>,
        cross_links: &mut Vec<CrossLink>,
    ) {
        if visited.contains(unit) {
            return;
        }
        visited.insert(unit.to_string());
        let Some(&root) = self.units.get(unit) else {
            return;
        };

        let mut exports: HashMap<String, NodeId> = HashMap::new();

        // Dependencies first; an import inside a cycle falls back to
        // whatever the first-visited member already cached.
        for import in imports_of(self.arena, root) {
            let Some(resolved) = resolve_import(self.name_to_path, &import) else {
                tracing::debug!("Unresolved import {:?} in {}", import, unit);
                continue;
            };
            if !cache.contains_key(&resolved) && !visited.contains(&resolved) {
                self.visit(&resolved, header_to_source, cache, visited, cross_links);
            }
            if let Some(table) = cache.get(&resolved) {
                for (name, &def) in table {
                    exports.insert(name.clone(), def);
                }
            }
        }

        for def in exported_definitions(self.arena, root) {
            exports.insert(self.arena.node(def).name.clone(), def);
        }

        if let Some(companion) = header_to_source.get(unit) {
            if let Some(&companion_root) = self.units.get(companion) {
                for def in exported_definitions(self.arena, companion_root) {
                    exports.insert(self.arena.node(def).name.clone(), def);
                }
            }
        }

        for sym in symbols_of(self.arena, root) {
            let type_name = self.arena.node(sym).type_name.clone();
            if type_name.is_empty() {
                continue;
            }
            if let Some(&def) = exports.get(&type_name) {
                self.arena.node_mut(sym).jump_to = Some(def);
                cross_links.push(CrossLink {
                    symbol: sym,
                    definition: def,
                });
            }
        }

        cache.insert(unit.to_string(), exports);
    }
}
