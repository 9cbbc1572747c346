//! Flattening of nested config trees into a single-level key-value map.
//!
//! Keys are built by joining the path from the root to each leaf with `_`.
//! Sequences contribute no index segment: a scalar inside a sequence is
//! stored under the sequence's own key, so repeated scalar siblings
//! overwrite one another (see [`sequence_scalar_key`]).

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

/// Separator joining key path segments. Fixed, not configurable.
pub const SEPARATOR: char = '_';

/// A leaf value in a flattened config.
///
/// YAML leaves keep their parsed type; INI values are always strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

/// Flat mapping from synthetic keys to leaf values.
///
/// Iteration follows insertion (traversal) order; later insertions under the
/// same key overwrite earlier ones.
pub type FlatConfig = IndexMap<String, Scalar>;

/// Flatten a parsed YAML tree into a [`FlatConfig`].
///
/// Callers pass the document root and an empty prefix. A bare scalar at the
/// top level yields an empty map.
pub fn flatten(node: &Value, prefix: &str) -> FlatConfig {
    let mut flat = FlatConfig::new();
    flatten_into(node, prefix, &mut flat);
    flat
}

fn flatten_into(node: &Value, prefix: &str, out: &mut FlatConfig) {
    match node {
        Value::Sequence(items) => {
            for item in items {
                if item.is_mapping() || item.is_sequence() {
                    flatten_into(item, &format!("{prefix}{SEPARATOR}"), out);
                } else {
                    out.insert(sequence_scalar_key(prefix), to_scalar(item));
                }
            }
        }
        Value::Mapping(map) => {
            for (key, value) in map {
                let full = format!("{prefix}{}", segment(key));
                match value {
                    Value::Mapping(_) | Value::Sequence(_) => {
                        flatten_into(value, &format!("{full}{SEPARATOR}"), out);
                    }
                    _ => {
                        out.insert(full, to_scalar(value));
                    }
                }
            }
        }
        Value::Tagged(tagged) => flatten_into(&tagged.value, prefix, out),
        scalar => {
            if !prefix.is_empty() {
                out.insert(sequence_scalar_key(prefix), to_scalar(scalar));
            }
        }
    }
}

/// Key used for a scalar element of a sequence.
///
/// The element's index is discarded: every scalar sibling shares the
/// sequence's own key and the last one wins. Intentional behavioral parity
/// with the original converter; an index-suffixed scheme would replace only
/// this function.
fn sequence_scalar_key(prefix: &str) -> String {
    prefix
        .strip_suffix(SEPARATOR)
        .unwrap_or(prefix)
        .to_string()
}

/// Render a mapping key as a path segment.
fn segment(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => to_scalar(other).to_string(),
    }
}

fn to_scalar(value: &Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Scalar::Int(i)
            } else {
                Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Scalar::String(s.clone()),
        // Containers never reach here; flatten_into recurses first.
        other => Scalar::String(format!("{other:?}")),
    }
}
