//! File filtering for directory loads
//!
//! Filename-pattern matching (what counts as C source or header) and
//! exclude filtering live here, outside the engine core. Excludes are
//! regexes matched partially against the full path, plus a built-in
//! gitignore-style noise filter for VCS and build directories.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Filenames the directory loader accepts
pub static SOURCE_OR_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-_]*\.(c|h)$").expect("static pattern"));

/// Filenames the cross-linker treats as compiled sources
pub static COMPILED_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-_]*\.c$").expect("static pattern"));

/// Import texts the cross-linker treats as header-shaped
pub static HEADER_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-_]*\.h$").expect("static pattern"));

/// Combined exclude filter for one directory load
pub struct SourceFilter {
    excludes: Vec<Regex>,
    noise: Gitignore,
}

impl SourceFilter {
    /// Build a filter rooted at `root`. Invalid exclude patterns are
    /// skipped with a warning rather than failing the load.
    pub fn new(root: &Path, excludes: &[String]) -> Self {
        let excludes = excludes
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Skipping invalid exclude pattern {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();

        let mut builder = GitignoreBuilder::new(root);
        for pattern in [".git/", ".hg/", ".svn/", "build/", "target/", "node_modules/"] {
            builder.add_line(None, pattern).ok();
        }

        Self {
            excludes,
            noise: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    /// Whether a path should be skipped entirely
    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        if self.noise.matched(path, is_dir).is_ignore() {
            return true;
        }
        let text = path.to_string_lossy();
        self.excludes.iter().any(|re| re.is_match(&text))
    }

    /// Whether a filename counts as loadable C source
    pub fn is_source_file(file_name: &str) -> bool {
        SOURCE_OR_HEADER.is_match(file_name)
    }
}
