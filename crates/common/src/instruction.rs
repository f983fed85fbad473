//! IR1 instructions and their operands.
//!
//! Instructions form a closed set: the interpreter dispatches over them with
//! an exhaustive match, so there is no "unknown instruction" at runtime.

use crate::op::{BinOp, RelOp, UnOp};

/// A source operand: either a name resolved through the environment or a
/// literal that evaluates to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Parameter, local variable or temporary.
    Name(String),
    Int(i32),
    Bool(bool),
    Str(String),
}

impl Operand {
    pub fn name(s: impl Into<String>) -> Self {
        Operand::Name(s.into())
    }
}

impl From<i32> for Operand {
    fn from(i: i32) -> Self {
        Operand::Int(i)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

/// A heap address expression: `offset[base]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addr {
    /// Must evaluate to an integer heap index.
    pub base: Operand,
    /// Added to the base to form the final index.
    pub offset: i32,
}

impl Addr {
    pub fn new(base: Operand, offset: i32) -> Self {
        Self { base, offset }
    }
}

/// One IR1 instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// `dst = lhs op rhs`
    Binop {
        op: BinOp,
        dst: String,
        lhs: Operand,
        rhs: Operand,
    },
    /// `dst = op src`
    Unop { op: UnOp, dst: String, src: Operand },
    /// `dst = src`
    Move { dst: String, src: Operand },
    /// `dst = offset[base]`
    Load { dst: String, addr: Addr },
    /// `offset[base] = src`
    Store { addr: Addr, src: Operand },
    /// `goto label`
    Jump { label: String },
    /// `if lhs op rhs goto label`
    CJump {
        op: RelOp,
        lhs: Operand,
        rhs: Operand,
        label: String,
    },
    /// `[dst =] call callee(args)`
    Call {
        callee: String,
        args: Vec<Operand>,
        dst: Option<String>,
    },
    /// `return [val]`
    Return { val: Option<Operand> },
    /// `label:`
    Label { name: String },
}

impl Inst {
    /// Short lowercase name of the instruction kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Inst::Binop { .. } => "binop",
            Inst::Unop { .. } => "unop",
            Inst::Move { .. } => "move",
            Inst::Load { .. } => "load",
            Inst::Store { .. } => "store",
            Inst::Jump { .. } => "jump",
            Inst::CJump { .. } => "cjump",
            Inst::Call { .. } => "call",
            Inst::Return { .. } => "return",
            Inst::Label { .. } => "label",
        }
    }

    /// The label declared by this instruction, if it is a label declaration.
    pub fn declared_label(&self) -> Option<&str> {
        match self {
            Inst::Label { name } => Some(name),
            _ => None,
        }
    }
}
