//! The engine - one working set of translation units and its queries
//!
//! Owns every loaded tree (through the node arena and the unit map), the
//! coordinate index, and the auxiliary maps the cross-linker needs.
//! Lifecycle: construct, load files, cross-link, query, drop. Loading and
//! cross-linking mutate shared state; queries must not run concurrently
//! with them (the engine is single-threaded by design).

use crate::builder::build_graph;
use crate::coord::Coordinate;
use crate::cst::CParser;
use crate::filter::SourceFilter;
use crate::index::CoordinateIndex;
use crate::linker::{self, CrossLink, CrossLinker, LinkerStats};
use crate::node::{NodeArena, NodeId};
use crate::{resolver, usages, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Cross-file name-resolution engine over one working set of C files.
pub struct Engine {
    parser: CParser,
    arena: NodeArena,
    /// Translation-unit roots keyed by absolute path
    units: HashMap<String, NodeId>,
    index: CoordinateIndex,
    /// Basename -> absolute paths sharing it, for import resolution
    name_to_path: HashMap<String, Vec<String>>,
    /// Header path -> companion source path, rebuilt per cross-link pass
    header_to_source: HashMap<String, String>,
    /// Everything the last cross-link pass resolved
    cross_links: Vec<CrossLink>,
}

impl Engine {
    /// Create an engine with an empty working set
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: CParser::new()?,
            arena: NodeArena::new(),
            units: HashMap::new(),
            index: CoordinateIndex::new(),
            name_to_path: HashMap::new(),
            header_to_source: HashMap::new(),
            cross_links: Vec::new(),
        })
    }

    /// Load one file, replacing any unit previously loaded at its path.
    ///
    /// Returns `false` (and registers nothing) when the file cannot be
    /// read or no tree can be produced; the rest of the working set is
    /// unaffected.
    pub fn load_file(&mut self, path: &Path) -> bool {
        let abs = match fs::canonicalize(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Cannot resolve {}: {}", path.display(), e);
                return false;
            }
        };
        let abs_str = abs.to_string_lossy().to_string();

        let source = match fs::read_to_string(&abs) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", abs_str, e);
                return false;
            }
        };

        let tree = match self.parser.parse(&source) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Cannot parse {}: {}", abs_str, e);
                return false;
            }
        };

        let Some(root) = build_graph(&mut self.arena, &source, tree.root()) else {
            tracing::warn!("No translation unit in {}", abs_str);
            return false;
        };
        self.arena.node_mut(root).name = abs_str.clone();

        let reloaded = self.units.insert(abs_str.clone(), root).is_some();
        if reloaded {
            self.rebuild_index();
        } else {
            self.index.add_tree(&self.arena, &abs_str, root);
        }

        if let Some(name) = abs.file_name().and_then(|s| s.to_str()) {
            let entry = self.name_to_path.entry(name.to_string()).or_default();
            if !entry.contains(&abs_str) {
                entry.push(abs_str.clone());
            }
        }

        tracing::debug!("Loaded {}", abs_str);
        true
    }

    /// Load every matching C source/header under `root`, skipping paths
    /// matched by `excludes` (regexes, partial match). Individual file
    /// failures are logged and do not abort the batch.
    pub fn load_directory(&mut self, root: &Path, excludes: &[String]) {
        let filter = SourceFilter::new(root, excludes);
        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !filter.is_excluded(e.path(), e.file_type().is_dir()));

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.path().file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if !SourceFilter::is_source_file(name) {
                continue;
            }
            self.load_file(entry.path());
        }
    }

    /// Run one cross-link pass over the whole working set.
    pub fn cross_link(&mut self) -> LinkerStats {
        let outcome = CrossLinker::new(&mut self.arena, &self.units, &self.name_to_path).run();
        self.cross_links = outcome.cross_links;
        self.header_to_source = outcome.header_to_source;
        tracing::debug!(
            "Cross-linked {} units, {} links",
            outcome.stats.units,
            outcome.stats.links
        );
        outcome.stats
    }

    /// What does the identifier at `coord` refer to?
    pub fn resolve(&self, coord: &Coordinate) -> Option<Coordinate> {
        resolver::resolve(&self.arena, &self.index, coord)
    }

    /// Where is the definition at `coord` used?
    pub fn find_usages(&self, coord: &Coordinate) -> Vec<Coordinate> {
        usages::find_usages(&self.arena, &self.index, coord)
    }

    /// The cross-links recorded by the last pass
    pub fn cross_links(&self) -> &[CrossLink] {
        &self.cross_links
    }

    /// Number of loaded translation units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Absolute paths of all loaded units
    pub fn unit_paths(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// The arena holding every loaded tree
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// The node indexed at a coordinate, if any
    pub fn node_at(&self, coord: &Coordinate) -> Option<NodeId> {
        self.index.get(coord)
    }

    /// Import targets of one unit, in pre-order
    pub fn imports_for_unit(&self, path: &str) -> Vec<String> {
        match self.units.get(path) {
            Some(&root) => linker::imports_of(&self.arena, root),
            None => Vec::new(),
        }
    }

    /// Exported definitions (direct named scopes) of one unit
    pub fn exported_definitions(&self, path: &str) -> Vec<NodeId> {
        match self.units.get(path) {
            Some(&root) => linker::exported_definitions(&self.arena, root),
            None => Vec::new(),
        }
    }

    /// All SYMBOL nodes of one unit, in pre-order
    pub fn symbols_for_unit(&self, path: &str) -> Vec<NodeId> {
        match self.units.get(path) {
            Some(&root) => linker::symbols_of(&self.arena, root),
            None => Vec::new(),
        }
    }

    /// Best-effort match of an import text against the working set
    pub fn resolve_import(&self, import: &str) -> Option<String> {
        linker::resolve_import(&self.name_to_path, import)
    }

    /// Companion source file recorded for a header, if any
    pub fn companion_source(&self, header: &str) -> Option<&str> {
        self.header_to_source.get(header).map(String::as_str)
    }

    /// Render one unit's scope graph as an indented tree
    pub fn render_unit(&self, path: &str) -> Option<String> {
        self.units.get(path).map(|&root| self.arena.render(root))
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (path, &root) in &self.units {
            self.index.add_tree(&self.arena, path, root);
        }
    }
}
