//! Configuration error types.
//!
//! This module defines error types for script loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading a script file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read input.
    #[error("failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to read a specific file with context.
    #[error("failed to read file '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A command with no arguments, located by its position in the tree.
    #[error("empty command at {0}")]
    EmptyCommand(String),
}
