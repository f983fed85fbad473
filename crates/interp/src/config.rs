//! Run configuration.

use ir1_common::ENTRY_POINT;

/// Options for one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Function execution starts from. Defaults to `_main`.
    pub entry: String,
    /// Maximum number of nested ordinary calls. `None` means the depth is
    /// bounded only by available memory.
    pub max_call_depth: Option<usize>,
    /// Maximum number of heap cells. `None` leaves only the 32-bit address
    /// space and available memory as bounds.
    pub max_heap_cells: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry: ENTRY_POINT.to_string(),
            max_call_depth: None,
            max_heap_cells: None,
        }
    }
}

impl Config {
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = Some(limit);
        self
    }

    pub fn with_max_heap_cells(mut self, limit: usize) -> Self {
        self.max_heap_cells = Some(limit);
        self
    }
}
