//! Line-delimited JSON protocol for editor integration
//!
//! One request object per line on stdin, one response object per line on
//! stdout. Requests are `{"command": ..., "payload": {...}}`:
//! - `index`: load a directory and cross-link it
//! - `resolve`: where does the identifier at this position point?
//! - `find_usages`: where is the definition at this position used?
//!
//! Responses echo `command` and carry `status` plus the result payload.
//! Malformed requests produce a `status: "error"` line; the loop only
//! ends at EOF.

use crate::coord::Coordinate;
use crate::engine::Engine;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

/// A decoded protocol request
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "snake_case")]
pub enum Request {
    Index {
        path: PathBuf,
        #[serde(default)]
        excludes: Vec<String>,
    },
    Resolve {
        path: String,
        line: u32,
        column: u32,
    },
    FindUsages {
        path: String,
        line: u32,
        column: u32,
    },
}

/// Handle one request against the engine, producing the response value.
pub fn handle(engine: &mut Engine, request: Request) -> Value {
    match request {
        Request::Index { path, excludes } => {
            let started = Instant::now();
            engine.load_directory(&path, &excludes);
            let stats = engine.cross_link();
            json!({
                "command": "index",
                "status": "ok",
                "time_ms": started.elapsed().as_millis() as u64,
                "units": engine.unit_count(),
                "links": stats.links,
            })
        }
        Request::Resolve { path, line, column } => {
            let coord = Coordinate::new(normalize(path), line, column);
            match engine.resolve(&coord) {
                Some(found) => json!({
                    "command": "resolve",
                    "status": "ok",
                    "coordinate": found,
                }),
                None => json!({
                    "command": "resolve",
                    "status": "not_found",
                }),
            }
        }
        Request::FindUsages { path, line, column } => {
            let coord = Coordinate::new(normalize(path), line, column);
            let coordinates = engine.find_usages(&coord);
            json!({
                "command": "find_usages",
                "status": "ok",
                "coordinates": coordinates,
            })
        }
    }
}

/// Run the protocol loop until EOF.
pub fn serve(engine: &mut Engine, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle(engine, request),
            Err(e) => json!({
                "status": "error",
                "message": format!("Bad request: {}", e),
            }),
        };

        let text = serde_json::to_string(&response)
            .map_err(|e| Error::Protocol(e.to_string()))?;
        output.write_all(text.as_bytes())?;
        output.write_all(b"\n")?;
        output.flush()?;
    }
    Ok(())
}

/// Clients send editor paths; units are keyed by canonical absolute path.
fn normalize(path: String) -> String {
    std::fs::canonicalize(&path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or(path)
}
