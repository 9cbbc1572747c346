//! Dotenv exporter: `KEY=VALUE` file plus an injectable environment sink.

use std::fs;
use std::path::Path;

use super::ExportError;
use crate::events::EventSink;
use crate::flatten::{FlatConfig, Scalar};

/// Default dotenv file name, created in the working directory when the user
/// supplies no path.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Destination for environment variables.
///
/// The process environment is global state; hiding it behind this trait
/// keeps the exporter testable against an in-memory map.
pub trait EnvSink {
    fn set(&mut self, key: &str, value: &str);
}

/// Binds [`EnvSink`] to the real process environment.
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

/// Export the flat config as environment variables.
///
/// Every entry whose value is neither null nor blank is trimmed, set in
/// `env`, and upserted as a `KEY=VALUE` line in the file at `path`. An
/// existing key in the file is updated in place; unrelated lines (including
/// comments) are preserved; nothing is duplicated.
pub fn export_env(
    config: &FlatConfig,
    path: &Path,
    env: &mut dyn EnvSink,
    events: &dyn EventSink,
) -> Result<(), ExportError> {
    let mut lines: Vec<String> = if path.is_file() {
        fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    for (key, value) in config {
        if matches!(value, Scalar::Null) {
            continue;
        }
        let key = key.trim();
        let value = value.to_string().trim().to_string();
        if value.is_empty() {
            continue;
        }
        events.info(&format!("setting env variable {key}={value}"));
        env.set(key, &value);
        upsert(&mut lines, key, &value);
    }

    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)?;
    events.info(&format!("dumped into file {}", path.display()));
    Ok(())
}

/// Replace the line for `key` if one exists, otherwise append.
fn upsert(lines: &mut Vec<String>, key: &str, value: &str) {
    let entry = format!("{key}={value}");
    for line in lines.iter_mut() {
        let Some((existing, _)) = line.split_once('=') else {
            continue;
        };
        if existing.trim() == key {
            *line = entry;
            return;
        }
    }
    lines.push(entry);
}
