//! Predicate rewrites used when pushing filters through a plan.
//!
//! Rewritten nodes are not analyzed; run the analyzer over the result
//! before reading types or selectivity.

use crate::expression::expr::parenthesize_operands;
use crate::expression::{CompoundOperator, CompoundPredicate, Expr};

/// Split a tree of ANDs into its conjuncts, left to right
pub fn conjuncts(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Compound(pred) if pred.op() == CompoundOperator::And => {
            pred.children().iter().flat_map(conjuncts).collect()
        }
        other => vec![other],
    }
}

/// Owned variant of [`conjuncts`]
pub fn into_conjuncts(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Compound(pred) if pred.op() == CompoundOperator::And => {
            let (_, children) = pred.into_parts();
            children.into_iter().flat_map(into_conjuncts).collect()
        }
        other => vec![other],
    }
}

/// Combine predicates into a left-deep AND; `None` for no predicates
pub fn conjunction(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(Expr::and)
}

/// Rewrite so that NOT only applies to predicates that cannot absorb it
/// (columns, literals, casts).
pub fn push_down_negation(expr: Expr) -> Expr {
    let Expr::Compound(pred) = expr else {
        return expr;
    };
    let (op, mut children) = pred.into_parts();
    match op {
        CompoundOperator::Not => {
            let operand = children.remove(0);
            match operand {
                Expr::Compound(_) | Expr::Binary(_) | Expr::In(_) | Expr::IsNull(_) => {
                    push_down_negation(operand.negate())
                }
                leaf => Expr::not(leaf),
            }
        }
        CompoundOperator::And | CompoundOperator::Or => {
            let right = children.pop().map(push_down_negation);
            let left = push_down_negation(children.remove(0));
            let mut rebuilt = Expr::Compound(CompoundPredicate::new(op, left, right));
            parenthesize_operands(&mut rebuilt);
            rebuilt
        }
    }
}
