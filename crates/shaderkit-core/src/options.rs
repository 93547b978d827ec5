//! Configuration options for composers.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options that tune how a [`Composer`](crate::Composer) reports code and
/// applies uniforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerOptions {
    /// Maximum width of a line in [`Composer::show_code`](crate::Composer::show_code),
    /// line number included.
    pub column_limit: usize,

    /// First texture unit handed to texture uniforms. Unit 0 is left for the
    /// primary data texture.
    pub first_texture_unit: u32,

    /// Maximum number of nested producer calls when resolving a uniform.
    pub max_producer_depth: usize,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            column_limit: 79,
            first_texture_unit: 1,
            max_producer_depth: 16,
        }
    }
}

impl ComposerOptions {
    /// Parses options from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes options to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
