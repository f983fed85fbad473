//! Fetch-execute loop and instruction semantics.

use std::io::Write;

use ir1_common::{
    Addr, ArithOp, BinOp, Inst, Operand, RelOp, UnOp, Value, BUILTIN_MALLOC, BUILTIN_PRINT_INT,
    BUILTIN_PRINT_STR,
};
use tracing::{debug, trace};

use crate::env::Env;
use crate::error::{RuntimeError, Site};
use crate::index::FuncEntry;
use crate::machine::{Frame, Interpreter};
use crate::stack::ensure_sufficient_stack;

/// What the loop does after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    /// Advance to the next instruction.
    Continue,
    /// Unwind to the caller.
    Return,
    /// Continue at the given offset.
    Jump(usize),
}

impl<'a, W: Write> Interpreter<'a, W> {
    /// Run the configured entry function with an empty environment.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuntimeError`] raised; execution stops there.
    /// An entry function that declares parameters fails before running,
    /// since it is called with no arguments.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let index = self.index;
        let entry = index.entry(&self.config.entry)?;
        if !entry.func.params.is_empty() {
            return Err(RuntimeError::ArityMismatch {
                at: Site::new(entry.func.name.as_str(), 0),
                callee: entry.func.name.clone(),
                expected: entry.func.params.len(),
                got: 0,
            });
        }
        debug!(entry = %entry.func.name, "run start");
        self.ret_val = None;
        self.run_function(entry, Env::new())?;
        debug!(heap_cells = self.heap.len(), "run finished");
        Ok(())
    }

    /// Run one function to completion, starting from offset 0 with `env`
    /// already holding the parameter bindings.
    pub(crate) fn run_function(
        &mut self,
        entry: &'a FuncEntry<'a>,
        env: Env,
    ) -> Result<(), RuntimeError> {
        let code = &entry.func.code;
        let mut frame = Frame::new(entry, env);

        while let Some(inst) = code.get(frame.pc) {
            trace!(func = %entry.func.name, pc = frame.pc, inst = inst.kind(), "step");
            match self.step(&mut frame, inst)? {
                Status::Continue => frame.pc += 1,
                Status::Return => return Ok(()),
                Status::Jump(target) => frame.pc = target,
            }
        }

        // Falling off the end is an implicit return of no value.
        self.ret_val = None;
        Ok(())
    }

    fn step(&mut self, frame: &mut Frame<'a>, inst: &'a Inst) -> Result<Status, RuntimeError> {
        match inst {
            Inst::Binop { op, dst, lhs, rhs } => exec_binop(frame, *op, dst, lhs, rhs),
            Inst::Unop { op, dst, src } => exec_unop(frame, *op, dst, src),
            Inst::Move { dst, src } => {
                let value = frame.eval(src)?;
                frame.env.bind(dst, value);
                Ok(Status::Continue)
            }
            Inst::Load { dst, addr } => self.exec_load(frame, dst, addr),
            Inst::Store { addr, src } => self.exec_store(frame, addr, src),
            Inst::Jump { label } => {
                let target = frame.resolve_label(label)?;
                trace!(%label, target, "jump");
                Ok(Status::Jump(target))
            }
            Inst::CJump {
                op,
                lhs,
                rhs,
                label,
            } => exec_cjump(frame, *op, lhs, rhs, label),
            Inst::Call { callee, args, dst } => {
                self.exec_call(frame, callee, args, dst.as_deref())?;
                Ok(Status::Continue)
            }
            Inst::Return { val } => {
                self.ret_val = match val {
                    Some(src) => Some(frame.eval(src)?),
                    None => None,
                };
                Ok(Status::Return)
            }
            Inst::Label { .. } => Ok(Status::Continue),
        }
    }

    // ---- Heap access ----

    fn exec_load(
        &mut self,
        frame: &mut Frame<'a>,
        dst: &str,
        addr: &Addr,
    ) -> Result<Status, RuntimeError> {
        let index = frame.eval_addr(addr, "load")?;
        let value = self
            .heap
            .load(index)
            .cloned()
            .ok_or_else(|| RuntimeError::HeapOutOfBounds {
                at: frame.site(),
                addr: index,
                len: self.heap.len(),
            })?;
        frame.env.bind(dst, value);
        Ok(Status::Continue)
    }

    fn exec_store(
        &mut self,
        frame: &mut Frame<'a>,
        addr: &Addr,
        src: &Operand,
    ) -> Result<Status, RuntimeError> {
        let value = frame.eval(src)?;
        let index = frame.eval_addr(addr, "store")?;
        let len = self.heap.len();
        let cell = self
            .heap
            .cell_mut(index)
            .ok_or_else(|| RuntimeError::HeapOutOfBounds {
                at: frame.site(),
                addr: index,
                len,
            })?;
        *cell = value;
        Ok(Status::Continue)
    }

    // ---- Calls ----

    fn exec_call(
        &mut self,
        frame: &mut Frame<'a>,
        callee: &str,
        args: &[Operand],
        dst: Option<&str>,
    ) -> Result<(), RuntimeError> {
        match callee {
            BUILTIN_MALLOC => self.call_malloc(frame, args, dst),
            BUILTIN_PRINT_INT | BUILTIN_PRINT_STR => self.call_print(frame, callee, args),
            _ => self.call_function(frame, callee, args, dst),
        }
    }

    /// `_malloc(n)`: append `n` undefined cells, bind the first address.
    fn call_malloc(
        &mut self,
        frame: &mut Frame<'a>,
        args: &[Operand],
        dst: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let value = single_arg(frame, BUILTIN_MALLOC, args)?;
        let Some(size) = value.as_int() else {
            let operands = format!("{BUILTIN_MALLOC}({})", value.kind());
            return Err(frame.type_mismatch("call", operands));
        };

        let invalid = || RuntimeError::InvalidAllocation {
            at: frame.site(),
            size: i64::from(size),
        };

        // Every allocated cell must stay addressable by a 32-bit integer.
        let start = self.heap.len();
        let limit = self
            .config
            .max_heap_cells
            .map_or(i32::MAX as usize, |max| max.min(i32::MAX as usize));
        let (count, addr) = match (usize::try_from(size), i32::try_from(start)) {
            (Ok(count), Ok(addr)) if start + count <= limit => (count, addr),
            _ => return Err(invalid()),
        };

        self.heap.allocate(count).map_err(|e| {
            debug!(size, error = %e, "allocation failed");
            invalid()
        })?;
        trace!(size, addr, "allocate");
        if let Some(dst) = dst {
            frame.env.bind(dst, Value::Int(addr));
        }
        Ok(())
    }

    /// `_printInt(v)` / `_printStr(v)`: write the value and a newline.
    /// Any destination is ignored.
    fn call_print(
        &mut self,
        frame: &mut Frame<'a>,
        callee: &str,
        args: &[Operand],
    ) -> Result<(), RuntimeError> {
        let value = single_arg(frame, callee, args)?;
        writeln!(self.out, "{value}").map_err(|e| RuntimeError::Output {
            at: frame.site(),
            message: e.to_string(),
        })
    }

    /// Ordinary call: bind arguments in a fresh environment, run the callee
    /// to completion, then bind its return value in the caller.
    fn call_function(
        &mut self,
        frame: &mut Frame<'a>,
        callee: &str,
        args: &[Operand],
        dst: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let index = self.index;
        let entry = index
            .get(callee)
            .ok_or_else(|| RuntimeError::UnknownFunction {
                at: frame.site(),
                name: callee.to_string(),
            })?;

        let params = &entry.func.params;
        if args.len() != params.len() {
            return Err(RuntimeError::ArityMismatch {
                at: frame.site(),
                callee: callee.to_string(),
                expected: params.len(),
                got: args.len(),
            });
        }

        if let Some(limit) = self.config.max_call_depth {
            if self.depth >= limit {
                return Err(RuntimeError::CallDepthExceeded {
                    at: frame.site(),
                    limit,
                });
            }
        }

        let mut callee_env = Env::new();
        for (param, arg) in params.iter().zip(args) {
            callee_env.bind(param, frame.eval(arg)?);
        }

        trace!(callee, depth = self.depth, "call");
        self.ret_val = None;
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.run_function(entry, callee_env));
        self.depth -= 1;
        result?;

        let value = self.ret_val.take().unwrap_or(Value::Undefined);
        if let Some(dst) = dst {
            frame.env.bind(dst, value);
        }
        Ok(())
    }
}

// ---- Pure instruction semantics ----

fn exec_binop(
    frame: &mut Frame<'_>,
    op: BinOp,
    dst: &str,
    lhs: &Operand,
    rhs: &Operand,
) -> Result<Status, RuntimeError> {
    let a = frame.eval(lhs)?;
    let b = frame.eval(rhs)?;

    let result = match (op, &a, &b) {
        (BinOp::Arith(ArithOp::And), Value::Bool(x), Value::Bool(y)) => Value::Bool(*x && *y),
        (BinOp::Arith(ArithOp::Or), Value::Bool(x), Value::Bool(y)) => Value::Bool(*x || *y),
        (BinOp::Arith(ArithOp::Add), Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_add(*y)),
        (BinOp::Arith(ArithOp::Sub), Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_sub(*y)),
        (BinOp::Arith(ArithOp::Mul), Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_mul(*y)),
        (BinOp::Arith(ArithOp::Div), Value::Int(_), Value::Int(0)) => {
            return Err(RuntimeError::DivisionByZero { at: frame.site() });
        }
        (BinOp::Arith(ArithOp::Div), Value::Int(x), Value::Int(y)) => Value::Int(floor_div(*x, *y)),
        (BinOp::Rel(op), Value::Int(x), Value::Int(y)) => Value::Bool(op.compare(x, y)),
        (BinOp::Rel(op), Value::Bool(x), Value::Bool(y)) if op.is_equality() => {
            Value::Bool(op.compare(x, y))
        }
        _ => {
            return Err(frame.type_mismatch(
                "binop",
                format!("{} {op} {}", a.kind(), b.kind()),
            ));
        }
    };

    frame.env.bind(dst, result);
    Ok(Status::Continue)
}

/// Negation is chosen by the operand: booleans flip, integers negate.
fn exec_unop(
    frame: &mut Frame<'_>,
    op: UnOp,
    dst: &str,
    src: &Operand,
) -> Result<Status, RuntimeError> {
    let result = match frame.eval(src)? {
        Value::Bool(b) => Value::Bool(!b),
        Value::Int(i) => Value::Int(i.wrapping_neg()),
        other => return Err(frame.type_mismatch("unop", format!("{op}{}", other.kind()))),
    };
    frame.env.bind(dst, result);
    Ok(Status::Continue)
}

fn exec_cjump(
    frame: &mut Frame<'_>,
    op: RelOp,
    lhs: &Operand,
    rhs: &Operand,
    label: &str,
) -> Result<Status, RuntimeError> {
    let a = frame.eval(lhs)?;
    let b = frame.eval(rhs)?;

    let taken = match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => op.compare(x, y),
        (Value::Bool(x), Value::Bool(y)) if op.is_equality() => op.compare(x, y),
        _ => {
            return Err(frame.type_mismatch(
                "cjump",
                format!("{} {op} {}", a.kind(), b.kind()),
            ));
        }
    };

    if !taken {
        return Ok(Status::Continue);
    }
    let target = frame.resolve_label(label)?;
    trace!(%label, target, "branch taken");
    Ok(Status::Jump(target))
}

/// Evaluate the only argument of a built-in.
fn single_arg(frame: &Frame<'_>, callee: &str, args: &[Operand]) -> Result<Value, RuntimeError> {
    match args {
        [arg] => frame.eval(arg),
        _ => Err(RuntimeError::ArityMismatch {
            at: frame.site(),
            callee: callee.to_string(),
            expected: 1,
            got: args.len(),
        }),
    }
}

/// Integer division rounding toward negative infinity. `y` must be nonzero.
/// `i32::MIN / -1` wraps to `i32::MIN`.
pub(crate) fn floor_div(x: i32, y: i32) -> i32 {
    let q = x.wrapping_div(y);
    if x.wrapping_rem(y) != 0 && ((x < 0) != (y < 0)) {
        q - 1
    } else {
        q
    }
}
