//! Loading raw schemas and data from JSON or YAML text.
//!
//! YAML is converted to JSON values with tags dropped. Anything JSON cannot
//! hold (a non-string map key, a NaN or infinite float) is a
//! [`ConversionError`] naming the dotted path of the offending node.

use std::path::Path;

use serde_json::Value;

/// Text formats accepted by [`parse_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// Format implied by a file extension (`json`, `yaml`, `yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Errors from loading raw schema or data text.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("YAML value has no JSON equivalent: {0}")]
    Conversion(#[from] ConversionError),
}

/// A YAML node with no JSON equivalent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason} at ({path})")]
pub struct ConversionError {
    /// Dotted key/index path of the node; empty for the document root.
    pub path: String,
    /// What could not be converted.
    pub reason: String,
}

/// Parse `text` in the given format into a JSON value.
pub fn parse_raw(text: &str, format: SourceFormat) -> Result<Value, LoadError> {
    match format {
        SourceFormat::Json => Ok(serde_json::from_str(text)?),
        SourceFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
            Ok(YamlConverter::default().convert(yaml)?)
        }
    }
}

/// Read and parse a file, choosing the format from its extension.
pub fn load_file(path: impl AsRef<Path>) -> Result<Value, LoadError> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path)
        .ok_or_else(|| LoadError::UnsupportedFormat(path.display().to_string()))?;
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), ?format, "loaded source file");
    parse_raw(&text, format)
}

/// Walks a YAML tree, tracking the path of the node being converted.
#[derive(Default)]
struct YamlConverter {
    path: Vec<String>,
}

impl YamlConverter {
    fn fail(&self, reason: String) -> ConversionError {
        ConversionError {
            path: self.path.join("."),
            reason,
        }
    }

    fn convert(&mut self, yaml: serde_yaml::Value) -> Result<Value, ConversionError> {
        use serde_yaml::Value as Yaml;

        match yaml {
            Yaml::Null => Ok(Value::Null),
            Yaml::Bool(b) => Ok(Value::Bool(b)),
            Yaml::Number(n) if n.is_nan() || n.is_infinite() => {
                Err(self.fail(format!("number ({n}) is not finite")))
            }
            Yaml::Number(n) => {
                serde_json::to_value(&n).map_err(|e| self.fail(format!("number ({n}): {e}")))
            }
            Yaml::String(s) => Ok(Value::String(s)),
            Yaml::Sequence(items) => {
                let mut array = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    self.path.push(i.to_string());
                    array.push(self.convert(item)?);
                    self.path.pop();
                }
                Ok(Value::Array(array))
            }
            Yaml::Mapping(mapping) => {
                let mut object = serde_json::Map::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let Yaml::String(key) = key else {
                        return Err(self.fail(format!(
                            "map key must be a string, but got ({})",
                            describe_key(&key)
                        )));
                    };
                    self.path.push(key.clone());
                    let value = self.convert(value)?;
                    self.path.pop();
                    object.insert(key, value);
                }
                Ok(Value::Object(object))
            }
            Yaml::Tagged(tagged) => self.convert(tagged.value),
        }
    }
}

fn describe_key(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::Null => "null".to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::String(s) => s.clone(),
        Yaml::Sequence(_) => "a sequence".to_string(),
        Yaml::Mapping(_) => "a mapping".to_string(),
        Yaml::Tagged(tagged) => describe_key(&tagged.value),
    }
}
