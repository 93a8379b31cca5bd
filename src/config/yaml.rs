//! YAML script parsing.
//!
//! A script file carries optional pipeline settings and the command tree:
//!
//! ```yaml
//! settings:
//!   channel_capacity: 16
//! script:
//!   - emit a b
//!   - run: openfile /etc/hosts
//!     children:
//!       - print
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::script::CommandNode;
use crate::execution::DEFAULT_CHANNEL_CAPACITY;

use super::builder::ScriptBuilder;
use super::error::ConfigError;

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    /// Bound of each direction of every channel pair.
    pub channel_capacity: usize,
    /// Emit executor trace lines.
    pub debug: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            debug: false,
        }
    }
}

/// One command in a script file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeConfig {
    /// Whitespace-separated command line without children.
    Simple(String),
    /// Command line with child commands.
    Detailed {
        run: String,
        #[serde(default)]
        children: Vec<NodeConfig>,
    },
}

impl NodeConfig {
    /// The command line of this node.
    pub fn run(&self) -> &str {
        match self {
            NodeConfig::Simple(run) => run,
            NodeConfig::Detailed { run, .. } => run,
        }
    }

    /// Child commands; empty for the simple form.
    pub fn children(&self) -> &[NodeConfig] {
        match self {
            NodeConfig::Simple(_) => &[],
            NodeConfig::Detailed { children, .. } => children,
        }
    }
}

/// A parsed script file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptFile {
    #[serde(default)]
    pub settings: PipelineSettings,
    #[serde(default)]
    pub script: Vec<NodeConfig>,
}

impl ScriptFile {
    /// Build the executable command tree.
    pub fn to_script(&self) -> Result<Vec<CommandNode>, ConfigError> {
        ScriptBuilder::build(&self.script)
    }
}

/// Loader for script files.
pub struct ScriptLoader;

impl ScriptLoader {
    /// Load a script from a file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<ScriptFile, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse_str(&content)
    }

    /// Load a script from any reader, such as standard input.
    pub fn load_reader(mut reader: impl std::io::Read) -> Result<ScriptFile, ConfigError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse_str(&content)
    }

    /// Parse a script from a YAML string.
    pub fn parse_str(yaml: &str) -> Result<ScriptFile, ConfigError> {
        let file: ScriptFile = if yaml.trim().is_empty() {
            ScriptFile::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        Self::validate(&file)?;
        Ok(file)
    }

    fn validate(file: &ScriptFile) -> Result<(), ConfigError> {
        if file.settings.channel_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "channel_capacity cannot be zero".into(),
            ));
        }
        ScriptBuilder::build(&file.script).map(|_| ())
    }
}
