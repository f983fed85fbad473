//! The global heap: a growable sequence of value cells.

use std::collections::TryReserveError;

use ir1_common::Value;

/// Process-wide heap shared by all invocations.
///
/// Allocation appends cells; nothing is ever freed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heap {
    cells: Vec<Value>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `size` undefined cells and return the index of the first.
    ///
    /// Fails without touching the heap when the memory cannot be reserved.
    pub fn allocate(&mut self, size: usize) -> Result<usize, TryReserveError> {
        let start = self.cells.len();
        self.cells.try_reserve_exact(size)?;
        self.cells.resize(start + size, Value::Undefined);
        Ok(start)
    }

    /// Read the cell at `addr`, or `None` when out of bounds.
    pub fn load(&self, addr: i64) -> Option<&Value> {
        usize::try_from(addr).ok().and_then(|i| self.cells.get(i))
    }

    /// Mutable access to the cell at `addr`, or `None` when out of bounds.
    pub fn cell_mut(&mut self, addr: i64) -> Option<&mut Value> {
        usize::try_from(addr)
            .ok()
            .and_then(move |i| self.cells.get_mut(i))
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
