//! Operators used by binary, unary and conditional-jump instructions.

use std::fmt;
use std::str::FromStr;

use crate::error::OperatorError;

/// Arithmetic and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Integer floor division. Division by zero is a runtime error.
    Div,
    /// Logical conjunction on booleans.
    And,
    /// Logical disjunction on booleans.
    Or,
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Operator of a binary instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Arith(ArithOp),
    Rel(RelOp),
}

/// Operator of a unary instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// Arithmetic negation.
    Neg,
    /// Logical negation.
    Not,
}

/// All arithmetic operators, in definition order.
pub const ALL_ARITH_OPS: [ArithOp; 6] = [
    ArithOp::Add,
    ArithOp::Sub,
    ArithOp::Mul,
    ArithOp::Div,
    ArithOp::And,
    ArithOp::Or,
];

/// All relational operators, in definition order.
pub const ALL_REL_OPS: [RelOp; 6] = [
    RelOp::Lt,
    RelOp::Le,
    RelOp::Gt,
    RelOp::Ge,
    RelOp::Eq,
    RelOp::Ne,
];

impl ArithOp {
    /// Textual symbol of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::And => "&&",
            ArithOp::Or => "||",
        }
    }
}

impl RelOp {
    /// Textual symbol of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
        }
    }

    /// Returns true for `==` and `!=`, the only comparisons defined on booleans.
    pub fn is_equality(self) -> bool {
        matches!(self, RelOp::Eq | RelOp::Ne)
    }

    /// Apply the comparison to two ordered operands.
    pub fn compare<T: Ord>(self, a: T, b: T) -> bool {
        match self {
            RelOp::Lt => a < b,
            RelOp::Le => a <= b,
            RelOp::Gt => a > b,
            RelOp::Ge => a >= b,
            RelOp::Eq => a == b,
            RelOp::Ne => a != b,
        }
    }
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Arith(op) => op.symbol(),
            BinOp::Rel(op) => op.symbol(),
        }
    }
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
        }
    }
}

impl FromStr for RelOp {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_REL_OPS
            .iter()
            .find(|op| op.symbol() == s)
            .copied()
            .ok_or_else(|| OperatorError::Unknown(s.to_string()))
    }
}

impl FromStr for BinOp {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(op) = ALL_ARITH_OPS.iter().find(|op| op.symbol() == s) {
            return Ok(BinOp::Arith(*op));
        }
        s.parse::<RelOp>().map(BinOp::Rel)
    }
}

impl FromStr for UnOp {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(UnOp::Neg),
            "!" => Ok(UnOp::Not),
            _ => Err(OperatorError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
