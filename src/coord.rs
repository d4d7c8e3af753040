//! Source coordinates - the addressing scheme for all queries
//!
//! A `Coordinate` is `(file path, line, column)`; it keys the coordinate
//! index and is what resolution queries take and return. Lines and columns
//! are 0-indexed, matching the concrete syntax tree's positions.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A position within one file, without the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// 0-indexed line
    pub line: u32,
    /// 0-indexed column
    pub column: u32,
}

impl Point {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A position in the working set: file path plus line and column.
///
/// The path is the absolute path the owning translation unit was loaded
/// under, so coordinates from different files never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Absolute path of the file
    pub path: String,
    /// 0-indexed line
    pub line: u32,
    /// 0-indexed column
    pub column: u32,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }

    /// Create a coordinate from a path and a [`Point`]
    pub fn at(path: impl Into<String>, point: Point) -> Self {
        Self::new(path, point.line, point.column)
    }

    /// Parse a `path:line:column` string.
    ///
    /// The path may itself contain colons; the last two segments are the
    /// line and column.
    pub fn parse(s: &str) -> Result<Self> {
        let (rest, column) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidCoordinate(s.to_string()))?;
        let (path, line) = rest
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidCoordinate(s.to_string()))?;

        if path.is_empty() {
            return Err(Error::InvalidCoordinate(s.to_string()));
        }

        let line: u32 = line
            .parse()
            .map_err(|_| Error::InvalidCoordinate(s.to_string()))?;
        let column: u32 = column
            .parse()
            .map_err(|_| Error::InvalidCoordinate(s.to_string()))?;

        Ok(Self::new(path, line, column))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_roundtrip() {
        let coord = Coordinate::new("/src/main.c", 36, 4);
        let s = coord.to_string();
        assert_eq!(s, "/src/main.c:36:4");

        let parsed = Coordinate::parse(&s).unwrap();
        assert_eq!(parsed, coord);
    }

    #[test]
    fn test_coordinate_parse_path_with_colon() {
        let parsed = Coordinate::parse("C:/code/a.c:1:2").unwrap();
        assert_eq!(parsed.path, "C:/code/a.c");
        assert_eq!(parsed.line, 1);
        assert_eq!(parsed.column, 2);
    }

    #[test]
    fn test_invalid_coordinate() {
        assert!(Coordinate::parse("no-numbers").is_err());
        assert!(Coordinate::parse("a.c:x:2").is_err());
        assert!(Coordinate::parse(":1:2").is_err());
    }
}
