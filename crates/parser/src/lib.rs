//! IR1 text front end: parser and canonical printer.
//!
//! # Usage
//!
//! ```
//! use ir1_parser::{parse, print};
//!
//! let text = "_main ()\n{\n  t = 2 + 3\n  call _printInt(t)\n}\n";
//! let program = parse(text).unwrap();
//! assert_eq!(program.instruction_count(), 2);
//! assert_eq!(print(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `parse(print(program)) == program` holds for every program whose names
//! are identifiers and not keywords. The printer emits canonical text; the
//! parser also accepts non-canonical spacing, comments and blank lines.

pub mod error;

mod lexer;
mod parser;
mod printer;

pub use error::ParseError;
pub use printer::print;

use ir1_common::Program;
use lexer::tokenize;
use parser::Parser;

/// Parse IR1 text into a program.
///
/// Returns the first error encountered, tagged with its line number.
pub fn parse(text: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(text)?;
    Parser::new(tokens).parse_program()
}
