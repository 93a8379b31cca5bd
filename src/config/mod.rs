//! Configuration loading and parsing.
//!
//! This module provides YAML-based script files and pipeline settings.

mod builder;
mod error;
mod yaml;

pub use builder::ScriptBuilder;
pub use error::ConfigError;
pub use yaml::{NodeConfig, PipelineSettings, ScriptFile, ScriptLoader};
