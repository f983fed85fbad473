//! Program index: function table and per-function label tables.
//!
//! Built by a single pass over the program before execution and read-only
//! afterwards.

use ir1_common::{Func, Program};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::RuntimeError;

/// A function together with its label table.
#[derive(Debug)]
pub struct FuncEntry<'a> {
    pub func: &'a Func,
    /// Label name -> offset of its declaration in `func.code`.
    labels: FxHashMap<&'a str, usize>,
}

impl<'a> FuncEntry<'a> {
    /// Scan `func` once, recording the offset of every label declaration.
    ///
    /// The offset counts every instruction, label declarations included,
    /// so jumping to a label lands on its (no-op) declaration.
    fn build(func: &'a Func) -> Result<Self, RuntimeError> {
        let mut labels = FxHashMap::default();
        for (offset, inst) in func.code.iter().enumerate() {
            let Some(name) = inst.declared_label() else {
                continue;
            };
            if let Some(&first) = labels.get(name) {
                return Err(RuntimeError::DuplicateLabel {
                    func: func.name.clone(),
                    label: name.to_string(),
                    first,
                    second: offset,
                });
            }
            labels.insert(name, offset);
        }
        Ok(Self { func, labels })
    }

    /// Resolve a label declared in this function.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }
}

/// Function name -> function entry, for one program.
#[derive(Debug)]
pub struct ProgramIndex<'a> {
    funcs: FxHashMap<&'a str, FuncEntry<'a>>,
}

impl<'a> ProgramIndex<'a> {
    /// Index every function of `program`.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate function name or a duplicate label within one
    /// function.
    pub fn build(program: &'a Program) -> Result<Self, RuntimeError> {
        let mut funcs = FxHashMap::default();
        for func in &program.funcs {
            let entry = FuncEntry::build(func)?;
            if funcs.insert(func.name.as_str(), entry).is_some() {
                return Err(RuntimeError::DuplicateFunction {
                    name: func.name.clone(),
                });
            }
        }
        debug!(
            functions = funcs.len(),
            instructions = program.instruction_count(),
            "program indexed"
        );
        Ok(Self { funcs })
    }

    pub fn get(&self, name: &str) -> Option<&FuncEntry<'a>> {
        self.funcs.get(name)
    }

    /// Look up the function execution starts from.
    pub fn entry(&self, name: &str) -> Result<&FuncEntry<'a>, RuntimeError> {
        self.get(name).ok_or_else(|| RuntimeError::MissingEntry {
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}
