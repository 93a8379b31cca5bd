use std::collections::HashMap;
use std::sync::Arc;

use super::Handler;
use super::builtins::{Emit, OpenFile, Print, Trace};

/// Maps command names to handlers.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry holding `trace`, `emit`, `print` and `openfile`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("trace", Arc::new(Trace));
        registry.register("emit", Arc::new(Emit));
        registry.register("print", Arc::new(Print::stdout()));
        registry.register("openfile", Arc::new(OpenFile));
        registry
    }

    /// Bind `name` to `handler`, returning any handler it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        self.handlers.insert(name.into(), handler)
    }

    /// Resolve a command name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
