//! Program representation: an ordered list of functions.

use crate::instruction::Inst;

/// An IR1 function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    /// Global name, e.g. `_main`.
    pub name: String,
    /// Parameter names, in declared order.
    pub params: Vec<String>,
    /// Local variable names. Informational only; locals come into existence
    /// when first assigned.
    pub locals: Vec<String>,
    /// Flat instruction sequence.
    pub code: Vec<Inst>,
}

impl Func {
    pub fn new(name: impl Into<String>, params: Vec<String>, code: Vec<Inst>) -> Self {
        Self {
            name: name.into(),
            params,
            locals: Vec::new(),
            code,
        }
    }

    /// Builder-style setter for the informational locals list.
    pub fn with_locals(mut self, locals: Vec<String>) -> Self {
        self.locals = locals;
        self
    }
}

/// An IR1 program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub funcs: Vec<Func>,
}

impl Program {
    /// Create a new program from a vector of functions.
    pub fn new(funcs: Vec<Func>) -> Self {
        Self { funcs }
    }

    /// Total number of instructions across all functions.
    pub fn instruction_count(&self) -> usize {
        self.funcs.iter().map(|f| f.code.len()).sum()
    }

    /// Returns true if the program has no functions.
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}
