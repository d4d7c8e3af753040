//! # Cnav - Cross-file name resolution for C source trees
//!
//! Cnav builds a scope graph per translation unit and links the graphs
//! across `#include` boundaries, answering "go to definition" and "find
//! usages" queries by source coordinate.
//!
//! Cnav provides:
//! - A scope-graph node model (scopes, symbols, references, imports)
//! - A graph builder that rewrites a C concrete syntax tree into scopes
//! - A coordinate index mapping every (file, line, column) to its node
//! - A stack-based resolution engine for qualified reference chains
//! - A dependency-ordered cross-linker for types defined in other files
//! - A line-delimited JSON protocol for editor integration

pub mod builder;
pub mod config;
pub mod coord;
pub mod cst;
pub mod engine;
pub mod filter;
pub mod index;
pub mod linker;
pub mod node;
pub mod protocol;
pub mod resolver;
pub mod usages;

// Re-exports for convenient access
pub use coord::{Coordinate, Point};
pub use engine::Engine;
pub use linker::{CrossLink, LinkerStats};
pub use node::{Node, NodeArena, NodeId, NodeKind};

/// Result type alias for Cnav operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Cnav operations.
///
/// Load failures, unresolved lookups, and unresolved imports are *values*
/// (booleans, `Option`, empty lists), not errors; these variants cover
/// conditions outside that taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Config error: {0}")]
    Config(String),
}
