//! Operator definitions for predicates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical operators of a compound predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompoundOperator {
    And,
    Or,
    Not,
}

impl CompoundOperator {
    /// Canonical SQL text, also the catalog name of the builtin
    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundOperator::And => "AND",
            CompoundOperator::Or => "OR",
            CompoundOperator::Not => "NOT",
        }
    }

    /// Number of operands the operator takes
    pub fn arity(&self) -> usize {
        match self {
            CompoundOperator::Not => 1,
            CompoundOperator::And | CompoundOperator::Or => 2,
        }
    }

    /// Binding strength when rendered as SQL; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            CompoundOperator::Or => 1,
            CompoundOperator::And => 2,
            CompoundOperator::Not => 3,
        }
    }

    /// Operator that De Morgan's laws swap this one with
    pub fn dual(&self) -> Option<CompoundOperator> {
        match self {
            CompoundOperator::And => Some(CompoundOperator::Or),
            CompoundOperator::Or => Some(CompoundOperator::And),
            CompoundOperator::Not => None,
        }
    }
}

impl fmt::Display for CompoundOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators of a binary predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 6] = [
        BinaryOperator::Eq,
        BinaryOperator::Ne,
        BinaryOperator::Lt,
        BinaryOperator::Le,
        BinaryOperator::Gt,
        BinaryOperator::Ge,
    ];

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
        }
    }

    /// Catalog name of the builtin implementing this comparison
    pub fn function_name(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "eq",
            BinaryOperator::Ne => "ne",
            BinaryOperator::Lt => "lt",
            BinaryOperator::Le => "le",
            BinaryOperator::Gt => "gt",
            BinaryOperator::Ge => "ge",
        }
    }

    /// Operator that yields the logical complement
    pub fn negate(&self) -> BinaryOperator {
        match self {
            BinaryOperator::Eq => BinaryOperator::Ne,
            BinaryOperator::Ne => BinaryOperator::Eq,
            BinaryOperator::Lt => BinaryOperator::Ge,
            BinaryOperator::Le => BinaryOperator::Gt,
            BinaryOperator::Gt => BinaryOperator::Le,
            BinaryOperator::Ge => BinaryOperator::Lt,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
