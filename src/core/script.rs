//! Script trees.
//!
//! A script is an ordered list of [`CommandNode`]s. Each node names a command
//! with its arguments and owns the child nodes whose output feeds its input.

use std::fmt;

/// One command in a script tree.
///
/// `args()[0]` is the command name. Nodes are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    args: Vec<String>,
    children: Vec<CommandNode>,
}

impl CommandNode {
    /// Create a leaf node from its arguments (name first).
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            children: Vec::new(),
        }
    }

    /// Create a leaf node from a whitespace-separated command line.
    pub fn from_words(line: &str) -> Self {
        Self::new(line.split_whitespace())
    }

    /// Append a child node.
    pub fn with_child(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child nodes, in order.
    pub fn with_children(mut self, children: impl IntoIterator<Item = CommandNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// The command name, if the node has any arguments at all.
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    /// Visit this node and all descendants depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a CommandNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))?;
        if self.children.is_empty() {
            write!(f, " {{}}")
        } else {
            write!(f, " {{ {} }}", join_nodes(&self.children))
        }
    }
}

fn join_nodes(nodes: &[CommandNode]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render a script on one line, quoted, for diagnostics.
pub fn render_script(script: &[CommandNode]) -> String {
    format!("'{}'", join_nodes(script))
}
