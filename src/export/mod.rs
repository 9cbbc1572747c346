//! Export sinks for a flattened config.
//!
//! Three sinks: print the map to stdout, write a dotenv-style `.env` file
//! (also populating an environment sink), or merge into a JSON document.

mod env;
mod json;

pub use env::{export_env, EnvSink, ProcessEnv, DEFAULT_ENV_FILE};
pub use json::{export_json, DEFAULT_JSON_FILE};

use std::fmt;
use std::io;

use crate::flatten::FlatConfig;

/// Export sink selected from the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkChoice {
    /// Print the flat map to stdout
    Dict,
    /// Write a dotenv file and set environment variables
    Env,
    /// Merge into a JSON document
    Json,
}

impl SinkChoice {
    /// Parse a menu answer. Anything outside `1`/`2`/`3` is the recoverable
    /// invalid-choice outcome, reported as `None` rather than an error.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(SinkChoice::Dict),
            "2" => Some(SinkChoice::Env),
            "3" => Some(SinkChoice::Json),
            _ => None,
        }
    }
}

/// Error type for the file-writing sinks. All variants are fatal.
#[derive(Debug)]
pub enum ExportError {
    /// IO error reading or writing the target file
    Io(io::Error),
    /// Existing JSON target could not be parsed or is not an object
    Json(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "failed to write export file: {e}"),
            ExportError::Json(msg) => write!(f, "invalid json target: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Json(_) => None,
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

/// Dict sink: print the flat map, one `key = value` line per entry, in
/// traversal order.
pub fn print_flat(config: &FlatConfig) {
    for (key, value) in config {
        println!("{key} = {value}");
    }
}
