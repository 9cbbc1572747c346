//! YAML loader: parse and delegate to the flattener.

use std::fs;
use std::path::Path;

use super::LoadError;
use crate::events::EventSink;
use crate::flatten::{flatten, FlatConfig};

/// Load a `.yaml` file into a [`FlatConfig`].
///
/// Parsing goes through `serde_yaml`, which handles only plain scalars,
/// mappings, and sequences — no arbitrary tags or constructors are ever
/// evaluated.
pub fn load_yaml(path: &Path, events: &dyn EventSink) -> Result<FlatConfig, LoadError> {
    if !path.exists() {
        events.warning(&format!("yaml file {} not found", path.display()));
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    events.info(&format!("reading configs from yaml file {}", path.display()));
    let content = fs::read_to_string(path)?;
    let doc: serde_yaml::Value = serde_yaml::from_str(&content)?;
    Ok(flatten(&doc, ""))
}
