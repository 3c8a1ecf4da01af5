//! Master configuration.
//!
//! Defaults suit most callers. Override via environment variables or
//! explicit construction; the struct also deserializes from a `camelCase`
//! block of a larger JSON/YAML config file.

use dschema_compiler::{CompilerOptions, CopyMode};
use dschema_core::DEFAULT_DEFINITION_PREFIX;
use dschema_validator::{ValidatorOptions, DEFAULT_MAX_REF_DEPTH};
use serde::{Deserialize, Serialize};

/// Configuration of a [`SchemaMaster`](crate::SchemaMaster).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MasterConfig {
    /// Raw node copy strategy while compiling.
    pub copy_mode: CopyMode,
    /// Prefix of definition paths (`#/definitions/<name>`).
    pub definition_path_prefix: String,
    /// Limit on nested recursive `$ref`s followed while validating.
    pub max_ref_depth: usize,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            copy_mode: CopyMode::default(),
            definition_path_prefix: DEFAULT_DEFINITION_PREFIX.to_string(),
            max_ref_depth: DEFAULT_MAX_REF_DEPTH,
        }
    }
}

impl MasterConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DSCHEMA_COPY_MODE`: `shallow` or `deep` (default: `shallow`)
    /// - `DSCHEMA_DEFINITION_PREFIX` (default: `#/definitions/`)
    /// - `DSCHEMA_MAX_REF_DEPTH` (default: 64)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let copy_mode = match var("DSCHEMA_COPY_MODE") {
            None => defaults.copy_mode,
            Some(raw) => CopyMode::from_name(raw.trim())
                .ok_or_else(|| ConfigError::Invalid("DSCHEMA_COPY_MODE".to_string(), raw))?,
        };

        let definition_path_prefix = match var("DSCHEMA_DEFINITION_PREFIX") {
            None => defaults.definition_path_prefix,
            Some(raw) if raw.is_empty() => {
                return Err(ConfigError::Invalid("DSCHEMA_DEFINITION_PREFIX".to_string(), raw))
            }
            Some(raw) => raw,
        };

        let max_ref_depth = match var("DSCHEMA_MAX_REF_DEPTH") {
            None => defaults.max_ref_depth,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("DSCHEMA_MAX_REF_DEPTH".to_string(), raw))?,
        };

        Ok(Self {
            copy_mode,
            definition_path_prefix,
            max_ref_depth,
        })
    }

    /// Options for the compiler master.
    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            copy_mode: self.copy_mode,
            definition_path_prefix: self.definition_path_prefix.clone(),
        }
    }

    /// Options for the validator master.
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            max_ref_depth: self.max_ref_depth,
            definition_path_prefix: self.definition_path_prefix.clone(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    Invalid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<MasterConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MasterConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_vars_absent() {
        assert_eq!(from_map(&[]).unwrap(), MasterConfig::default());
    }

    #[test]
    fn test_vars_override_defaults() {
        let config = from_map(&[
            ("DSCHEMA_COPY_MODE", "Deep"),
            ("DSCHEMA_DEFINITION_PREFIX", "#/defs/"),
            ("DSCHEMA_MAX_REF_DEPTH", " 8 "),
        ])
        .unwrap();
        assert_eq!(config.copy_mode, CopyMode::Deep);
        assert_eq!(config.definition_path_prefix, "#/defs/");
        assert_eq!(config.max_ref_depth, 8);
        assert_eq!(config.validator_options().definition_path_prefix, "#/defs/");
        assert_eq!(config.compiler_options().copy_mode, CopyMode::Deep);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = from_map(&[("DSCHEMA_COPY_MODE", "sideways")]).unwrap_err();
        assert_eq!(err.to_string(), r#"invalid value for DSCHEMA_COPY_MODE: "sideways""#);
        assert!(from_map(&[("DSCHEMA_MAX_REF_DEPTH", "-1")]).is_err());
        assert!(from_map(&[("DSCHEMA_DEFINITION_PREFIX", "")]).is_err());
    }

    #[test]
    fn test_deserialize_partial_block() {
        let config: MasterConfig = serde_json::from_str(r#"{"copyMode": "deep"}"#).unwrap();
        assert_eq!(config.copy_mode, CopyMode::Deep);
        assert_eq!(config.max_ref_depth, 64);
    }
}
