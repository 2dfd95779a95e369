use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// Flat variable mapping as seen by the debugger.
pub type ScopeMap = HashMap<String, Value>;

// ================================
// VariableScope – live, shared handle
// ================================

/// Handle to the live variable scope of a workflow run.
///
/// Clones share the same underlying map, so the executor and the debugger
/// observe each other's writes. Readers that need isolation call
/// [`VariableScope::snapshot`], which returns an owned deep copy.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    variables: Arc<RwLock<ScopeMap>>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(variables: ScopeMap) -> Self {
        VariableScope {
            variables: Arc::new(RwLock::new(variables)),
        }
    }

    pub fn len(&self) -> usize {
        self.variables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.read().is_empty()
    }

    /// Get a variable by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.variables.read().get(name).cloned()
    }

    /// Set a single variable
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.variables.write().insert(name.into(), value);
    }

    /// Remove a variable, returning its previous value.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.variables.write().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.read().contains_key(name)
    }

    /// Variable names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.variables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Deep copy of the entire scope.
    pub fn snapshot(&self) -> ScopeMap {
        self.variables.read().clone()
    }

    /// Clear the scope in place and refill it from `variables`.
    ///
    /// The underlying map is reused so every clone of this handle sees the new
    /// contents.
    pub fn replace_all(&self, variables: &ScopeMap) {
        let mut guard = self.variables.write();
        guard.clear();
        guard.extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Whether two handles point at the same live scope.
    pub fn same_scope(&self, other: &VariableScope) -> bool {
        Arc::ptr_eq(&self.variables, &other.variables)
    }
}

impl From<ScopeMap> for VariableScope {
    fn from(value: ScopeMap) -> Self {
        Self::from_map(value)
    }
}
