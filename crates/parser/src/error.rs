//! Error types for the IR1 parser.

use thiserror::Error;

/// Errors produced while parsing IR1 text. Lines are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A character that starts no token.
    #[error("line {line}: unexpected character '{ch}'")]
    UnexpectedChar { line: usize, ch: char },

    /// A string literal with no closing quote on its line.
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    /// An unsupported backslash escape inside a string literal.
    #[error("line {line}: invalid escape '\\{ch}'")]
    InvalidEscape { line: usize, ch: char },

    /// An integer literal that does not fit in 32 bits.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where something else was required.
    #[error("line {line}: expected {expected}, found '{token}'")]
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        token: String,
    },

    /// The input ended in the middle of a function.
    #[error("line {line}: expected {expected}, found end of input")]
    UnexpectedEnd { line: usize, expected: &'static str },
}

impl ParseError {
    /// The line the error was reported on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedChar { line, .. }
            | ParseError::UnterminatedString { line }
            | ParseError::InvalidEscape { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::UnexpectedEnd { line, .. } => *line,
        }
    }
}
