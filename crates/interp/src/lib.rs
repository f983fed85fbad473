//! IR1 interpreter: executes parsed IR1 programs directly.
//!
//! The engine has:
//! - A [`ProgramIndex`] mapping function names to code and, per function,
//!   label names to instruction offsets
//! - One [`Env`] per active invocation
//! - A single growable [`Heap`] shared by all invocations
//! - A fetch-execute loop that recurses on the host stack for calls
//!
//! # Usage
//!
//! ```
//! use ir1_common::{Func, Inst, Operand, Program};
//! use ir1_interp::run;
//!
//! let program = Program::new(vec![Func::new(
//!     "_main",
//!     vec![],
//!     vec![Inst::Call {
//!         callee: "_printInt".to_string(),
//!         args: vec![Operand::Int(42)],
//!         dst: None,
//!     }],
//! )]);
//!
//! let mut out = Vec::new();
//! run(&program, &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "42\n");
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod execute;
pub mod heap;
pub mod index;
pub mod machine;

mod stack;

pub use config::Config;
pub use env::Env;
pub use error::{RuntimeError, Site};
pub use heap::Heap;
pub use index::{FuncEntry, ProgramIndex};
pub use machine::Interpreter;

use std::io::Write;

use ir1_common::Program;

/// Execute a program from `_main`, writing its output to `out`.
///
/// This is the primary entry point. It:
/// 1. Builds the function and label tables
/// 2. Locates `_main`
/// 3. Runs it with an empty environment until it returns
/// 4. Returns the final heap
///
/// # Errors
///
/// Returns [`RuntimeError`] on the first failure (duplicate label, missing
/// entry, unbound name, type mismatch, division by zero, ...).
pub fn run<W: Write>(program: &Program, out: W) -> Result<Heap, RuntimeError> {
    run_with_config(program, Config::default(), out)
}

/// Execute a program with explicit options.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_config<W: Write>(
    program: &Program,
    config: Config,
    out: W,
) -> Result<Heap, RuntimeError> {
    let index = ProgramIndex::build(program)?;
    let mut interp = Interpreter::new(&index, config, out);
    interp.run()?;
    Ok(interp.into_heap())
}
