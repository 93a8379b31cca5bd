//! Script builder from YAML configuration.
//!
//! This module converts [`NodeConfig`] trees into executable
//! [`CommandNode`] trees.

use crate::core::script::CommandNode;

use super::error::ConfigError;
use super::yaml::NodeConfig;

/// Builder for command trees from configuration.
pub struct ScriptBuilder;

impl ScriptBuilder {
    /// Build the top-level command list.
    pub fn build(nodes: &[NodeConfig]) -> Result<Vec<CommandNode>, ConfigError> {
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| Self::build_node(node, &format!("script[{}]", i)))
            .collect()
    }

    fn build_node(config: &NodeConfig, position: &str) -> Result<CommandNode, ConfigError> {
        let node = CommandNode::from_words(config.run());
        if node.name().is_none() {
            return Err(ConfigError::EmptyCommand(position.to_string()));
        }

        let children = config
            .children()
            .iter()
            .enumerate()
            .map(|(i, child)| Self::build_node(child, &format!("{}.children[{}]", position, i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(node.with_children(children))
    }
}
