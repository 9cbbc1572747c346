//! JSON exporter: merge flattened configs into a shared JSON document.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::ExportError;
use crate::events::EventSink;
use crate::flatten::FlatConfig;

/// Default JSON file name, created in the working directory when the user
/// points at no existing file.
pub const DEFAULT_JSON_FILE: &str = "result.json";

/// Export the flat config under `document_key` into the JSON object file at
/// `path`.
///
/// An existing file is loaded, the entry for `document_key` is inserted or
/// overwritten, and the whole document is written back; a missing file is
/// created with the single entry. One file can so accumulate exports from
/// multiple source configs across runs, namespaced by `"<name>.<ext>"`.
pub fn export_json(
    config: &FlatConfig,
    document_key: &str,
    path: &Path,
    events: &dyn EventSink,
) -> Result<(), ExportError> {
    let mut document: Map<String, Value> = if path.is_file() {
        events.info(&format!("reading json file {}", path.display()));
        let content = fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ExportError::Json("top level is not an object".to_string())),
            Err(e) => return Err(ExportError::Json(e.to_string())),
        }
    } else {
        events.info(&format!("creating new json file {}", path.display()));
        Map::new()
    };

    let entry = serde_json::to_value(config)
        .map_err(|e| ExportError::Json(e.to_string()))?;
    document.insert(document_key.to_string(), entry);

    let rendered = serde_json::to_string(&Value::Object(document))
        .map_err(|e| ExportError::Json(e.to_string()))?;
    fs::write(path, rendered)?;
    events.info(&format!(
        "writing configs to json file {} completed",
        path.display()
    ));
    Ok(())
}
