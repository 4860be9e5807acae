//! Name to tool lookup.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ToolError;

use super::definition::ToolDefinition;
use super::kind::ToolKind;

#[derive(Debug, Clone)]
struct Entry {
    definition: ToolDefinition,
    kind: ToolKind,
}

/// Registered tools, in registration order.
///
/// Populated once while the agent is built and read-only afterwards. Lookup
/// is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in ToolKind::ALL {
            let name = kind.as_str();
            registry.index.insert(name.to_owned(), registry.entries.len());
            registry.entries.push(Entry {
                definition: kind.definition(),
                kind,
            });
        }
        registry
    }

    fn key(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }

    /// Register `definition`, dispatching to `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] if the name is taken, or
    /// [`ToolError::InvalidArgument`] if `definition` declares fewer required
    /// parameters than the handler reads.
    pub fn register(&mut self, definition: ToolDefinition, kind: ToolKind) -> Result<(), ToolError> {
        let key = Self::key(&definition.name);
        if self.index.contains_key(&key) {
            return Err(ToolError::duplicate_tool(definition.name));
        }
        let needed = kind.definition().required_count();
        if definition.required_count() < needed {
            return Err(ToolError::invalid_argument(format!(
                "{} declares {} required parameter(s) but {kind} needs {needed}",
                definition.name,
                definition.required_count()
            )));
        }
        debug!(tool = %definition.name, handler = %kind, "registering tool");
        self.index.insert(key, self.entries.len());
        self.entries.push(Entry { definition, kind });
        Ok(())
    }

    /// Definition registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index
            .get(&Self::key(name))
            .map(|&i| &self.entries[i].definition)
    }

    /// Handler and definition registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] if nothing is registered under it.
    pub fn lookup(&self, name: &str) -> Result<(ToolKind, &ToolDefinition), ToolError> {
        self.index
            .get(&Self::key(name))
            .map(|&i| (self.entries[i].kind, &self.entries[i].definition))
            .ok_or_else(|| ToolError::unknown_tool(name.trim()))
    }

    /// Handler registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] if nothing is registered under it.
    pub fn resolve(&self, name: &str) -> Result<ToolKind, ToolError> {
        self.lookup(name).map(|(kind, _)| kind)
    }

    /// All definitions, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.entries.iter().map(|e| &e.definition).collect()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&Self::key(name))
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_in_order() {
        let registry = ToolRegistry::builtin();
        let names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["balance", "transfer", "price", "estimate_gas"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolKind::Price.definition(), ToolKind::Price)
            .unwrap();

        let dup = ToolDefinition::new("PRICE", "another price tool");
        let err = registry.register(dup, ToolKind::Balance).unwrap_err();
        assert_eq!(err, ToolError::DuplicateTool("PRICE".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn aliases_dispatch_to_their_kind() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new("get_balance", "alias").param("address", "string", "addr"),
                ToolKind::Balance,
            )
            .unwrap();

        assert_eq!(registry.resolve("get_balance").unwrap(), ToolKind::Balance);
        assert!(registry.get("balance").is_none());
    }

    #[test]
    fn resolve_unknown() {
        let registry = ToolRegistry::builtin();
        assert_eq!(
            registry.resolve(" swap ").unwrap_err(),
            ToolError::UnknownTool("swap".into())
        );
        assert!(registry.contains("Transfer"));
        assert!(!registry.is_empty());
    }
}
