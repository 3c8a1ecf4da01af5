//! Validator configuration.

use dschema_core::DEFAULT_DEFINITION_PREFIX;
use serde::{Deserialize, Serialize};

/// Default limit on nested lazy `$ref` resolutions.
pub const DEFAULT_MAX_REF_DEPTH: usize = 64;

/// Options of a [`ValidatorMaster`](crate::ValidatorMaster).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Maximum number of lazy `$ref`s followed along one path of the data.
    pub max_ref_depth: usize,
    /// Prefix of definition paths, as used when compiling.
    pub definition_path_prefix: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_ref_depth: DEFAULT_MAX_REF_DEPTH,
            definition_path_prefix: DEFAULT_DEFINITION_PREFIX.to_string(),
        }
    }
}
