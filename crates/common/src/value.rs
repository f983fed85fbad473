//! Runtime value representation for the IR1 interpreter.
//!
//! Values live in per-invocation environments and in heap cells. They are
//! immutable: every operation builds a new value.

use std::fmt;
use std::rc::Rc;

/// Runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 32-bit integer.
    Int(i32),
    /// Boolean value.
    Bool(bool),
    /// Immutable text. Shared so that copying a string between bindings
    /// and heap cells does not copy its bytes.
    Str(Rc<str>),
    /// Content of an allocated heap cell that was never written.
    Undefined,
}

/// The kind of a [`Value`], used in type-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Bool,
    Str,
    Undefined,
}

impl Value {
    /// Build a string value.
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Bool(_) => Kind::Bool,
            Value::Str(_) => Kind::Str,
            Value::Undefined => Kind::Undefined,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

/// The textual form written by the print built-ins.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Undefined => f.write_str("UndVal"),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int => "Int",
            Kind::Bool => "Bool",
            Kind::Str => "Str",
            Kind::Undefined => "Undefined",
        };
        f.write_str(name)
    }
}
