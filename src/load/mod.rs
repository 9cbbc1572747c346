//! Config file loading.
//!
//! This module provides:
//! - Source type resolution from the file extension
//! - The two-phase INI loader (with extended interpolation)
//! - The YAML loader
//! - The shared [`LoadError`] for all fatal load failures

mod ini;
mod yaml;

pub use ini::{load_ini, IniError};
pub use yaml::load_yaml;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::events::EventSink;
use crate::flatten::FlatConfig;

/// Supported source formats, resolved once from the path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.conf`, `.cfg`, `.ini`
    Ini,
    /// `.yaml`
    Yaml,
}

impl SourceKind {
    /// Resolve the source format from the file extension.
    ///
    /// Runs before any file access so an unsupported extension is rejected
    /// without touching the filesystem.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match ext {
            "conf" | "cfg" | "ini" => Ok(SourceKind::Ini),
            "yaml" => Ok(SourceKind::Yaml),
            _ => Err(LoadError::UnsupportedType(ext.to_string())),
        }
    }
}

/// Error type for loading a config file. All variants are fatal.
#[derive(Debug)]
pub enum LoadError {
    /// Input file does not exist
    NotFound(PathBuf),
    /// Extension is not one of conf/cfg/ini/yaml
    UnsupportedType(String),
    /// IO error reading the file
    Io(io::Error),
    /// INI parse or interpolation error
    Ini(IniError),
    /// YAML parse error
    Yaml(serde_yaml::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(path) => {
                write!(f, "config file {} not found", path.display())
            }
            LoadError::UnsupportedType(ext) if ext.is_empty() => {
                write!(f, "file has no extension and is not a supported config file")
            }
            LoadError::UnsupportedType(ext) => {
                write!(f, ".{ext} is not a supported config file type")
            }
            LoadError::Io(e) => write!(f, "failed to read config file: {e}"),
            LoadError::Ini(e) => write!(f, "failed to parse config file: {e}"),
            LoadError::Yaml(e) => write!(f, "failed to parse yaml file: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Ini(e) => Some(e),
            LoadError::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        LoadError::Yaml(e)
    }
}

/// Load a config file, dispatching on its extension.
pub fn load_path(path: &Path, events: &dyn EventSink) -> Result<FlatConfig, LoadError> {
    match SourceKind::from_path(path)? {
        SourceKind::Ini => load_ini(path, events),
        SourceKind::Yaml => load_yaml(path, events),
    }
}

/// Document key used to namespace an export inside a shared JSON file:
/// `"<stem>.<extension>"` of the source path.
pub fn document_key(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    format!("{stem}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_ini_extensions() {
        for ext in ["conf", "cfg", "ini"] {
            let path = PathBuf::from(format!("app.{ext}"));
            assert_eq!(SourceKind::from_path(&path).unwrap(), SourceKind::Ini);
        }
    }

    #[test]
    fn test_source_kind_yaml() {
        assert_eq!(
            SourceKind::from_path(Path::new("app.yaml")).unwrap(),
            SourceKind::Yaml
        );
    }

    #[test]
    fn test_source_kind_rejects_unsupported() {
        let err = SourceKind::from_path(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedType(ext) if ext == "txt"));
    }

    #[test]
    fn test_source_kind_rejects_missing_extension() {
        let err = SourceKind::from_path(Path::new("Makefile")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedType(ext) if ext.is_empty()));
    }

    #[test]
    fn test_unsupported_rejected_before_file_access() {
        // The path does not exist; resolution must still report the type.
        let err = SourceKind::from_path(Path::new("/no/such/dir/app.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedType(_)));
    }

    #[test]
    fn test_document_key() {
        assert_eq!(document_key(Path::new("/etc/app/db.conf")), "db.conf");
        assert_eq!(document_key(Path::new("settings.yaml")), "settings.yaml");
    }
}
