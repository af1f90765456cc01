//! OPVM Configuration
//!
//! Defines defaults for the operand substrate.
//! Configuration specifies starting values only; the stack and codec own their behavior.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{OpvmError, OpvmResult};

/// Substrate configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OpvmConfig {
    /// Key byte for keyed stream codecs built by tooling
    pub stream_key: u8,

    /// Starting capacity of operand stacks (0 = grow to 4 on first push)
    pub initial_stack_capacity: usize,

    /// Default tracing filter directive used by the CLI
    pub log_filter: String,
}

impl Default for OpvmConfig {
    fn default() -> Self {
        OpvmConfig {
            stream_key: 0,
            initial_stack_capacity: 0,
            log_filter: "warn".to_string(),
        }
    }
}

impl OpvmConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> OpvmResult<Self> {
        toml::from_str(text).map_err(|e| OpvmError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> OpvmResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| OpvmError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}
