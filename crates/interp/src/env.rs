//! Per-invocation binding environment.

use ir1_common::Value;
use rustc_hash::FxHashMap;

/// Maps parameter, local and temporary names to values.
///
/// One environment exists per active invocation. It starts empty, receives
/// the parameter bindings, and grows as instructions produce results.
#[derive(Debug, Clone, Default)]
pub struct Env {
    bindings: FxHashMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn bind(&mut self, name: &str, value: Value) {
        match self.bindings.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.bindings.insert(name.to_string(), value);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
