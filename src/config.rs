//! Interpreter settings, loadable from a YAML file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Nested calls allowed before a run fails with a runtime error.
    pub max_call_depth: usize,
    /// Whether the stdin provider writes `input` prompts to stdout.
    pub echo_prompts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            echo_prompts: true,
        }
    }
}

impl Config {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).context("invalid interpreter config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&source).with_context(|| format!("in {}", path.display()))
    }
}
