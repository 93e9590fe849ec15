//! Mapping from tool name to invocable unit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::Value;

/// A named invocable unit. One method models both synchronous and
/// asynchronous tools: a synchronous body simply never suspends, so it
/// resolves on first poll.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Runs the tool against its fully-resolved arguments and returns a
    /// JSON-shaped output, or a [`ToolError`] that ends the run.
    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;
}

/// Read-only (during a run) mapping from tool name to tool. Lookup is O(1).
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under `name`, replacing any prior entry of the same
    /// name.
    pub fn register(&mut self, name: impl Into<String>, tool: Arc<dyn Tool>) {
        self.tools.insert(name.into(), tool);
    }

    /// Builder-style variant of [`Self::register`].
    pub fn with_tool(mut self, name: impl Into<String>, tool: Arc<dyn Tool>) -> Self {
        self.register(name, tool);
        self
    }

    /// True if `name` resolves to a registered tool.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// The tool registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
            Ok(args)
        }
    }

    #[tokio::test]
    async fn registered_tool_is_found_and_invoked() {
        let registry = ToolRegistry::new().with_tool("echo", Arc::new(Echo));
        assert!(registry.contains("echo"));

        let tool = registry.get("echo").unwrap();
        let out = tool.invoke(json!({"a": 1})).await.unwrap();
        assert_eq!(out, json!({"a": 1}));
    }

    #[test]
    fn unregistered_tool_is_absent() {
        let registry = ToolRegistry::new();
        assert!(!registry.contains("missing"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", Arc::new(Echo));
        registry.register("echo", Arc::new(Echo));
        assert!(registry.contains("echo"));
    }
}
