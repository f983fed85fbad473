//! Errors for operator lookup.

use thiserror::Error;

/// Errors produced when resolving an operator from its symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    /// The symbol does not name an operator of the requested class.
    #[error("unknown operator '{0}'")]
    Unknown(String),
}
