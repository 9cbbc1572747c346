//! Two-phase INI loader.
//!
//! Phase A parses a sectioned file and resolves extended interpolation
//! (`${section:option}` / `${option}` placeholders, `$$` escapes). When the
//! file turns out to have no section header at all, the loader transparently
//! retries with Phase B: a plain `key=value` parser that namespaces every
//! key under the `default` section.

use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;

use super::LoadError;
use crate::events::EventSink;
use crate::flatten::{FlatConfig, Scalar, SEPARATOR};

/// Section name used by the Phase B fallback parser.
const DEFAULT_SECTION: &str = "default";

/// Maximum interpolation chain length before a reference is considered
/// circular.
const MAX_INTERPOLATION_DEPTH: usize = 10;

type Sections = IndexMap<String, IndexMap<String, String>>;

/// Error type for INI parsing and interpolation.
#[derive(Debug)]
pub enum IniError {
    /// First meaningful line is not a `[section]` header. Triggers the
    /// Phase B fallback rather than surfacing to the user.
    MissingSectionHeader { line: usize },
    /// A line that is neither a header, a comment, nor a key-value pair
    Malformed { line: usize, content: String },
    /// An interpolation placeholder points at an option that does not exist
    UnresolvedReference { option: String, reference: String },
    /// Interpolation chain exceeded the depth limit (circular reference)
    InterpolationDepth { option: String },
}

impl fmt::Display for IniError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IniError::MissingSectionHeader { line } => {
                write!(f, "no section header before line {line}")
            }
            IniError::Malformed { line, content } => {
                write!(f, "malformed line {line}: {content:?}")
            }
            IniError::UnresolvedReference { option, reference } => {
                write!(f, "option {option} references unknown ${{{reference}}}")
            }
            IniError::InterpolationDepth { option } => {
                write!(f, "interpolation for option {option} exceeds depth limit (circular reference?)")
            }
        }
    }
}

impl std::error::Error for IniError {}

/// Load a `.conf`/`.cfg`/`.ini` file into a [`FlatConfig`].
///
/// Keys are `"<section>_<option>"` with the option name lowercased and
/// interpolation already resolved. A file without section headers falls back
/// to the line parser, namespacing keys as `"default_<key>"`.
pub fn load_ini(path: &Path, events: &dyn EventSink) -> Result<FlatConfig, LoadError> {
    if !path.exists() {
        events.error(&format!("config file {} not found", path.display()));
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    events.info(&format!("reading config file {}", path.display()));
    let content = fs::read_to_string(path)?;

    match parse_sections(&content) {
        Ok(sections) => {
            let resolved = resolve_interpolation(&sections).map_err(LoadError::Ini)?;
            let mut flat = FlatConfig::new();
            for (section, options) in &resolved {
                for (option, value) in options {
                    flat.insert(
                        format!("{section}{SEPARATOR}{option}"),
                        Scalar::String(value.clone()),
                    );
                }
            }
            Ok(flat)
        }
        Err(IniError::MissingSectionHeader { line }) => {
            events.warning(&format!(
                "no section header before line {line}; retrying {} with default section",
                path.display()
            ));
            let flat = parse_fallback(&content).map_err(LoadError::Ini)?;
            events.info(&format!(
                "loaded {} with default section",
                path.display()
            ));
            Ok(flat)
        }
        Err(e) => Err(LoadError::Ini(e)),
    }
}

/// Phase A: parse the file into ordered sections of raw (uninterpolated)
/// option values.
fn parse_sections(content: &str) -> Result<Sections, IniError> {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        // Section header
        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let Some(section) = current.as_deref() else {
            return Err(IniError::MissingSectionHeader { line: idx + 1 });
        };

        // key = value, or key: value
        let Some(pos) = line.find(['=', ':']) else {
            return Err(IniError::Malformed {
                line: idx + 1,
                content: line.to_string(),
            });
        };
        let (key, value) = line.split_at(pos);
        let key = key.trim().to_lowercase();
        let value = value[1..].trim().to_string();
        sections
            .get_mut(section)
            .expect("current section was inserted on header")
            .insert(key, value);
    }

    Ok(sections)
}

/// Phase B: no section headers at all. Every `key=value` line lands under
/// the `default` section; `#` comments and blank lines are skipped; a line
/// without exactly one `=` aborts the whole load.
fn parse_fallback(content: &str) -> Result<FlatConfig, IniError> {
    let mut flat = FlatConfig::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.matches('=').count() != 1 {
            return Err(IniError::Malformed {
                line: idx + 1,
                content: line.to_string(),
            });
        }
        let (key, value) = line.split_once('=').expect("line contains '='");
        flat.insert(
            format!("{DEFAULT_SECTION}{SEPARATOR}{}", key.trim()),
            Scalar::from(value.trim()),
        );
    }

    Ok(flat)
}

/// Resolve `${section:option}` and `${option}` placeholders in every value.
///
/// References resolve recursively against the raw (unresolved) sections, so
/// definition order does not matter. `$$` produces a literal `$`.
fn resolve_interpolation(sections: &Sections) -> Result<Sections, IniError> {
    let token = Regex::new(r"\$\$|\$\{([^{}]*)\}").expect("interpolation pattern is valid");
    let mut resolved = Sections::new();

    for (name, options) in sections {
        let mut out = IndexMap::new();
        for (option, raw) in options {
            let value = resolve_value(&token, sections, name, option, raw, 0)?;
            out.insert(option.clone(), value);
        }
        resolved.insert(name.clone(), out);
    }

    Ok(resolved)
}

fn resolve_value(
    token: &Regex,
    sections: &Sections,
    section: &str,
    option: &str,
    raw: &str,
    depth: usize,
) -> Result<String, IniError> {
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(IniError::InterpolationDepth {
            option: format!("{section}:{option}"),
        });
    }
    if !raw.contains('$') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for m in token.find_iter(raw) {
        out.push_str(&raw[last..m.start()]);
        let text = m.as_str();
        if text == "$$" {
            out.push('$');
        } else {
            let reference = &text[2..text.len() - 1];
            let (ref_section, ref_option) = match reference.split_once(':') {
                Some((s, o)) => (s.trim(), o.trim()),
                None => (section, reference.trim()),
            };
            let ref_option = ref_option.to_lowercase();
            let target = sections
                .get(ref_section)
                .and_then(|opts| opts.get(&ref_option))
                .ok_or_else(|| IniError::UnresolvedReference {
                    option: format!("{section}:{option}"),
                    reference: reference.to_string(),
                })?;
            let value =
                resolve_value(token, sections, ref_section, &ref_option, target, depth + 1)?;
            out.push_str(&value);
        }
        last = m.end();
    }
    out.push_str(&raw[last..]);
    Ok(out)
}
