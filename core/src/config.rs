use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StoreError};

/// Defaults applied when a query does not say otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub related_depth: usize,
    pub learning_path_len: usize,
    pub cluster_min_weight: u32,
    pub mindmap_depth: usize,
    pub snippet_context_words: usize,
    pub search_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            related_depth: 2,
            learning_path_len: 8,
            cluster_min_weight: 2,
            mindmap_depth: 2,
            snippet_context_words: 8,
            search_limit: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(StoreError::io(path))?;
        Self::from_toml_str(&raw)
    }
}
