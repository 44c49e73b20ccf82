//! Site variables: named JSON values such as plugin settings.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;
use vetrina_sdk::storage::Variables;

/// In-memory variable store.
#[derive(Debug, Default)]
pub struct VariableStore {
    values: RwLock<HashMap<String, Value>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable value (insert or replace).
    pub fn set(&self, name: &str, value: Value) {
        debug!(name = %name, "setting variable");
        self.values.write().insert(name.to_string(), value);
    }

    /// Delete a variable. Returns `true` if it existed.
    pub fn delete(&self, name: &str) -> bool {
        self.values.write().remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl Variables for VariableStore {
    fn get(&self, name: &str) -> Option<Value> {
        self.values.read().get(name).cloned()
    }
}
