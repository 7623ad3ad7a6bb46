//! # Layered Configuration Loading
//!
//! Loads a typed configuration struct from a YAML, TOML or JSON file (chosen
//! by extension) and optionally layers environment variable overrides on top.
//!
//! Environment overrides use a prefix and `__` as the nesting separator:
//! `SHORTAGE__HORIZON_DAYS=14` sets `horizon_days`,
//! `SHORTAGE__MODEL__N_TREES=50` sets `model.n_trees`. Keys are matched
//! case-insensitively against lowercase field names.
//!
//! ```rust,no_run
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ServiceConfig {
//!     horizon_days: u32,
//! }
//!
//! let config: ServiceConfig =
//!     insight_config::load_with_env("analyzer.toml", "SHORTAGE").unwrap();
//! ```

use insight_error::{InsightError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            "json" => Ok(Format::Json),
            other => Err(InsightError::config(format!(
                "unsupported config format '{other}' for {}",
                path.display()
            ))),
        }
    }
}

/// Parses file content into a generic value tree.
fn parse_value(content: &str, format: Format) -> Result<Value> {
    match format {
        Format::Yaml => serde_yaml::from_str(content)
            .map_err(|e| InsightError::config(format!("invalid YAML: {e}"))),
        Format::Toml => {
            let parsed: toml::Value = toml::from_str(content)
                .map_err(|e| InsightError::config(format!("invalid TOML: {e}")))?;
            serde_json::to_value(parsed).map_err(InsightError::from)
        }
        Format::Json => serde_json::from_str(content)
            .map_err(|e| InsightError::config(format!("invalid JSON: {e}"))),
    }
}

fn read_value(path: &Path) -> Result<Value> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        InsightError::config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    parse_value(&content, format)
}

fn deserialize<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| InsightError::config(e.to_string()))
}

/// Loads configuration from a single file.
pub fn load_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    deserialize(read_value(path.as_ref())?)
}

/// Loads configuration from a file, then applies `PREFIX__...` overrides
/// from the process environment.
pub fn load_with_env<T: DeserializeOwned>(path: impl AsRef<Path>, prefix: &str) -> Result<T> {
    let mut value = read_value(path.as_ref())?;
    apply_env_overrides(&mut value, prefix, std::env::vars());
    deserialize(value)
}

/// Builds configuration purely from defaults (via `T: Default` serialized
/// shape) plus environment overrides.
pub fn load_env_only<T>(prefix: &str) -> Result<T>
where
    T: DeserializeOwned + serde::Serialize + Default,
{
    let mut value = serde_json::to_value(T::default())?;
    apply_env_overrides(&mut value, prefix, std::env::vars());
    deserialize(value)
}

/// Applies overrides from an iterator of `(key, value)` pairs.
///
/// Returns the number of overrides applied.
pub fn apply_env_overrides<I>(target: &mut Value, prefix: &str, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    let marker = format!("{}__", prefix.to_ascii_uppercase());
    let mut applied = 0;

    for (key, raw) in vars {
        let upper = key.to_ascii_uppercase();
        let Some(path) = upper.strip_prefix(&marker) else {
            continue;
        };
        let segments: Vec<String> = path
            .split("__")
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if segments.is_empty() {
            continue;
        }

        set_path(target, &segments, parse_scalar(&raw));
        tracing::debug!(key = %key, "applied config override from environment");
        applied += 1;
    }

    applied
}

fn set_path(target: &mut Value, segments: &[String], new_value: Value) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };

    match segments {
        [] => {}
        [last] => {
            map.insert(last.clone(), new_value);
        }
        [head, rest @ ..] => {
            let child = map
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            set_path(child, rest, new_value);
        }
    }
}

/// Interprets an environment string as the most specific JSON scalar.
fn parse_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(b) = trimmed.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(v) = serde_json::from_str(trimmed) {
            return v;
        }
    }
    Value::String(raw.to_string())
}
