//! Error types for expression analysis.

use crate::types::DataType;
use thiserror::Error;

/// Semantic errors caused by the query being analyzed.
///
/// Broken internal invariants (malformed nodes, missing builtin operators)
/// are not reported here; they panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// An operand of AND/OR/NOT does not produce a boolean
    #[error(
        "Operand '{operand}' part of predicate '{predicate}' should return type 'BOOLEAN' but returns type '{actual}'."
    )]
    NonBooleanOperand {
        operand: String,
        predicate: String,
        actual: DataType,
    },

    /// No comparison operator accepts both operand types
    #[error("operands of type {left} and {right} are not comparable: {expr}")]
    IncomparableOperands {
        left: DataType,
        right: DataType,
        expr: String,
    },

    /// An IN list item is not compatible with the tested value
    #[error("incompatible IN list values in '{expr}'")]
    IncompatibleInList { expr: String },

    /// Column reference could not be resolved
    #[error("could not resolve column reference: '{0}'")]
    UnknownColumn(String),

    /// Explicit or implicit cast is not allowed
    #[error("invalid type cast of {expr} from {from} to {to}")]
    InvalidCast {
        expr: String,
        from: DataType,
        to: DataType,
    },

    /// Expression tree exceeds the configured depth
    #[error("exceeded the maximum depth of an expression tree ({limit})")]
    ExprTooDeep { limit: usize },
}

/// Result type for expression analysis
pub type AnalysisResult<T> = Result<T, AnalysisError>;
