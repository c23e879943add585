//! Expression trees for SQL predicates.
//!
//! This module provides:
//! - Expression node kinds and the protocol they share
//! - Semantic analysis (type checking, operator resolution, selectivity)
//! - Negation and conjunct rewrites
//! - Bound column extraction for predicate analysis

pub mod binary_predicate;
pub mod cast;
pub mod compound_predicate;
pub mod error;
pub mod expr;
pub mod in_predicate;
pub mod is_null_predicate;
pub mod literal;
pub mod operator;
pub mod rewrite;
pub mod selectivity;
pub mod slot_ref;

pub use binary_predicate::BinaryPredicate;
pub use cast::CastExpr;
pub use compound_predicate::CompoundPredicate;
pub use error::{AnalysisError, AnalysisResult};
pub use expr::{BoundSlotPredicate, Expr, ExprState, LogicalCombinator};
pub use in_predicate::InPredicate;
pub use is_null_predicate::IsNullPredicate;
pub use literal::LiteralExpr;
pub use operator::{BinaryOperator, CompoundOperator};
pub use selectivity::Selectivity;
pub use slot_ref::SlotRef;
