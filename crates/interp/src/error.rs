//! Runtime errors for the IR1 interpreter.
//!
//! Every error is fatal: the run stops at the first one. Errors raised while
//! executing an instruction carry the [`Site`] (function and instruction
//! offset) where they happened.

use std::fmt;

use thiserror::Error;

/// Location of an instruction: function name and zero-based offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub func: String,
    pub pc: usize,
}

impl Site {
    pub fn new(func: impl Into<String>, pc: usize) -> Self {
        Self {
            func: func.into(),
            pc,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.func, self.pc)
    }
}

/// Errors that stop program execution.
///
/// The first three variants are detected before any instruction runs;
/// the rest while executing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Two functions share a name.
    #[error("duplicate function '{name}'")]
    DuplicateFunction { name: String },

    /// Two label declarations share a name within one function.
    #[error("duplicate label '{label}' in function '{func}' (offsets {first} and {second})")]
    DuplicateLabel {
        func: String,
        label: String,
        first: usize,
        second: usize,
    },

    /// The designated entry function does not exist.
    #[error("entry function '{name}' not found")]
    MissingEntry { name: String },

    /// A name was read before anything was bound to it.
    #[error("unbound name '{name}' at {at}")]
    UnboundName { at: Site, name: String },

    /// An operator was applied to operand kinds it does not support.
    #[error("type mismatch in {inst} at {at}: {operands}")]
    TypeMismatch {
        at: Site,
        inst: &'static str,
        operands: String,
    },

    /// A jump target is not declared in the executing function.
    #[error("unresolved label '{label}' at {at}")]
    UnresolvedLabel { at: Site, label: String },

    /// A call names neither a function nor a built-in.
    #[error("call to unknown function '{name}' at {at}")]
    UnknownFunction { at: Site, name: String },

    /// Argument count differs from the callee's parameter count.
    #[error("'{callee}' expects {expected} argument(s), got {got} at {at}")]
    ArityMismatch {
        at: Site,
        callee: String,
        expected: usize,
        got: usize,
    },

    /// Load or store outside `[0, heap length)`.
    #[error("heap address {addr} out of bounds (length {len}) at {at}")]
    HeapOutOfBounds { at: Site, addr: i64, len: usize },

    /// Integer division by zero.
    #[error("division by zero at {at}")]
    DivisionByZero { at: Site },

    /// Negative allocation size, or a heap that would outgrow 32-bit addresses.
    #[error("invalid allocation of {size} cell(s) at {at}")]
    InvalidAllocation { at: Site, size: i64 },

    /// Call nesting exceeded the configured limit.
    #[error("call depth exceeded limit {limit} at {at}")]
    CallDepthExceeded { at: Site, limit: usize },

    /// Writing program output failed.
    #[error("output failed at {at}: {message}")]
    Output { at: Site, message: String },
}

impl RuntimeError {
    /// Returns true for errors detected before execution starts.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            RuntimeError::DuplicateFunction { .. }
                | RuntimeError::DuplicateLabel { .. }
                | RuntimeError::MissingEntry { .. }
        )
    }
}
