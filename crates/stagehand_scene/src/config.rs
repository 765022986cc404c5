//! Scene configuration presets.

use crate::error::{Result, SceneError};
use serde::{Deserialize, Serialize};

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Suffix appended to the name of an instantiated root node.
    pub clone_suffix: String,
    /// Emit a `trace` event for every lifecycle hook dispatched.
    pub trace_lifecycle: bool,
    /// Number of nodes to reserve space for up front.
    pub initial_capacity: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl SceneConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            clone_suffix: "(Clone)".to_string(),
            trace_lifecycle: false,
            initial_capacity: 64,
        }
    }

    /// Debug configuration that traces every lifecycle hook.
    pub fn debug() -> Self {
        Self {
            trace_lifecycle: true,
            ..Self::standard()
        }
    }

    /// Parse a configuration from TOML text.
    ///
    /// Missing keys fall back to [`SceneConfig::standard`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SceneError::Config(e.to_string()))
    }

    /// Set the clone name suffix.
    pub fn with_clone_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.clone_suffix = suffix.into();
        self
    }

    /// Enable or disable lifecycle tracing.
    pub fn with_trace_lifecycle(mut self, trace: bool) -> Self {
        self.trace_lifecycle = trace;
        self
    }

    /// Set the initial node capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SceneConfig::from_toml_str("trace_lifecycle = true").unwrap();

        assert!(config.trace_lifecycle);
        assert_eq!(config.clone_suffix, "(Clone)");
        assert_eq!(config.initial_capacity, 64);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SceneConfig::from_toml_str("initial_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }

    #[test]
    fn test_builders() {
        let config = SceneConfig::debug()
            .with_clone_suffix(" copy")
            .with_initial_capacity(8);

        assert!(config.trace_lifecycle);
        assert_eq!(config.clone_suffix, " copy");
        assert_eq!(config.initial_capacity, 8);
    }
}
