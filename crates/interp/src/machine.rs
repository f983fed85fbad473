//! Interpreter state: the session object and per-invocation frames.

use std::io::Write;

use ir1_common::{Addr, Operand, Value};

use crate::config::Config;
use crate::env::Env;
use crate::error::{RuntimeError, Site};
use crate::heap::Heap;
use crate::index::{FuncEntry, ProgramIndex};

/// The IR1 interpreter.
///
/// Holds everything shared across invocations for one run: the program
/// index, the heap, the return-value slot and the output stream.
pub struct Interpreter<'a, W> {
    /// Function and label tables. Read-only.
    pub(crate) index: &'a ProgramIndex<'a>,
    pub(crate) config: Config,
    pub(crate) heap: Heap,
    /// Written by `return`, taken by the caller's `call` right after the
    /// callee unwinds. `None` is the "no value" marker.
    pub(crate) ret_val: Option<Value>,
    /// Destination of the print built-ins.
    pub(crate) out: W,
    /// Number of ordinary calls currently active.
    pub(crate) depth: usize,
}

impl<'a, W: Write> Interpreter<'a, W> {
    /// Create an interpreter over an indexed program with an empty heap.
    pub fn new(index: &'a ProgramIndex<'a>, config: Config, out: W) -> Self {
        Self {
            index,
            config,
            heap: Heap::new(),
            ret_val: None,
            out,
            depth: 0,
        }
    }

    /// Consume the interpreter, keeping only its heap.
    pub fn into_heap(self) -> Heap {
        self.heap
    }
}

/// One active invocation: the function being run, its environment and its
/// program counter.
pub(crate) struct Frame<'a> {
    pub(crate) entry: &'a FuncEntry<'a>,
    pub(crate) env: Env,
    pub(crate) pc: usize,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(entry: &'a FuncEntry<'a>, env: Env) -> Self {
        Self { entry, env, pc: 0 }
    }

    /// Where the current instruction lives, for error reports.
    pub(crate) fn site(&self) -> Site {
        Site::new(self.entry.func.name.as_str(), self.pc)
    }

    /// Evaluate an operand: names go through the environment, literals
    /// evaluate to themselves.
    pub(crate) fn eval(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        match operand {
            Operand::Name(name) => {
                self.env
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnboundName {
                        at: self.site(),
                        name: name.clone(),
                    })
            }
            Operand::Int(i) => Ok(Value::Int(*i)),
            Operand::Bool(b) => Ok(Value::Bool(*b)),
            Operand::Str(s) => Ok(Value::str(s.as_str())),
        }
    }

    /// Evaluate an address expression to a heap index (not yet bounds-checked).
    pub(crate) fn eval_addr(&self, addr: &Addr, inst: &'static str) -> Result<i64, RuntimeError> {
        match self.eval(&addr.base)? {
            Value::Int(base) => Ok(i64::from(base) + i64::from(addr.offset)),
            other => Err(self.type_mismatch(inst, format!("address base is {}", other.kind()))),
        }
    }

    /// Resolve a label in the executing function's own label table.
    pub(crate) fn resolve_label(&self, label: &str) -> Result<usize, RuntimeError> {
        self.entry
            .label(label)
            .ok_or_else(|| RuntimeError::UnresolvedLabel {
                at: self.site(),
                label: label.to_string(),
            })
    }

    pub(crate) fn type_mismatch(&self, inst: &'static str, operands: String) -> RuntimeError {
        RuntimeError::TypeMismatch {
            at: self.site(),
            inst,
            operands,
        }
    }
}
