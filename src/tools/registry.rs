//! Insertion-order tool catalog.

use crate::tools::{Tool, ToolDefinition};
use std::collections::HashMap;
use std::sync::Arc;

struct Entry {
    tool: Arc<dyn Tool>,
    enabled: bool,
}

/// Catalog of tools keyed by name, preserving registration order.
///
/// A tool may be registered-and-disabled: present in the catalog (so it can
/// later be enabled or looked up by name) but excluded from
/// [`ToolRegistry::definitions`], the enumeration handed to the model.
#[derive(Default)]
pub struct ToolRegistry {
    order: Vec<String>,
    entries: HashMap<String, Entry>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tool`, enabled or disabled as given. Re-registering an
    /// existing name replaces it in place without changing its position.
    pub fn register(&mut self, tool: Arc<dyn Tool>, enabled: bool) {
        let name = tool.name().to_string();
        if !self.entries.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.entries.insert(name, Entry { tool, enabled });
    }

    /// Enables a registered tool by name. No-op if the name is unknown.
    pub fn enable(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.enabled = true;
        }
    }

    /// Disables a registered tool by name. No-op if the name is unknown.
    pub fn disable(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.enabled = false;
        }
    }

    /// Returns `true` if `name` is registered and enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.enabled)
    }

    /// Looks up an enabled tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entries
            .get(name)
            .filter(|e| e.enabled)
            .map(|e| Arc::clone(&e.tool))
    }

    /// Returns the definitions of every enabled tool, in registration order,
    /// optionally restricted to `allowed` names.
    #[must_use]
    pub fn definitions(&self, allowed: Option<&[String]>) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .filter(|e| e.enabled)
            .filter(|e| allowed.is_none_or(|names| names.iter().any(|n| n == e.tool.name())))
            .map(|e| e.tool.definition())
            .collect()
    }

    /// Number of registered tools (enabled or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
