//! Compiler configuration.

use dschema_core::DEFAULT_DEFINITION_PREFIX;
use serde::{Deserialize, Serialize};

/// How raw schema nodes are held while compiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    /// Borrow raw nodes from the caller's input.
    #[default]
    Shallow,
    /// Clone every raw node before it is registered or compiled.
    Deep,
}

impl CopyMode {
    /// Parse a mode name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "shallow" => Some(Self::Shallow),
            "deep" => Some(Self::Deep),
            _ => None,
        }
    }
}

/// Options of a [`CompilerMaster`](crate::CompilerMaster).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Raw node copy strategy.
    pub copy_mode: CopyMode,
    /// Prefix of generated definition paths.
    pub definition_path_prefix: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            copy_mode: CopyMode::default(),
            definition_path_prefix: DEFAULT_DEFINITION_PREFIX.to_string(),
        }
    }
}
