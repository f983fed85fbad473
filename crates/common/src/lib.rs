//! IR1 common types.
//!
//! This crate provides the data structures shared by the IR1 parser and
//! interpreter:
//!
//! - [`Program`] and [`Func`]: an ordered list of functions
//! - [`Inst`]: the ten instruction kinds, with [`Operand`] and [`Addr`]
//! - [`BinOp`], [`ArithOp`], [`RelOp`], [`UnOp`]: operators
//! - [`Value`]: runtime value representation

pub mod error;
pub mod instruction;
pub mod op;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::OperatorError;
pub use instruction::{Addr, Inst, Operand};
pub use op::{ArithOp, BinOp, RelOp, UnOp, ALL_ARITH_OPS, ALL_REL_OPS};
pub use program::{Func, Program};
pub use value::{Kind, Value};

/// Name of the function execution starts from.
pub const ENTRY_POINT: &str = "_main";

/// Built-in: allocate heap cells, returning the address of the first one.
pub const BUILTIN_MALLOC: &str = "_malloc";

/// Built-in: print an integer followed by a newline.
pub const BUILTIN_PRINT_INT: &str = "_printInt";

/// Built-in: print a string followed by a newline.
pub const BUILTIN_PRINT_STR: &str = "_printStr";
