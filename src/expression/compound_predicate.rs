//! Logical AND, OR and NOT over boolean operands.
//!
//! A compound predicate resolves its operator against the builtins
//! registered by [`CompoundPredicate::init_builtins`], combines the
//! selectivity of its operands assuming independence, and can push a
//! negation one level down with De Morgan's laws.

use crate::analyzer::Analyzer;
use crate::catalog::{CompareMode, Function, FunctionCatalog};
use crate::expression::expr::{
    analyze_children, cast_for_function_call, child_types, parenthesize_operands, Expr, ExprState,
    LogicalCombinator,
};
use crate::expression::{AnalysisError, AnalysisResult, CompoundOperator, Selectivity, SlotRef};
use crate::types::DataType;
use crate::wire::NodeType;
use log::debug;
use std::sync::Arc;

/// AND / OR with two operands, NOT with one
#[derive(Debug, Clone)]
pub struct CompoundPredicate {
    op: CompoundOperator,
    pub(crate) children: Vec<Expr>,
    pub(crate) state: ExprState,
}

impl CompoundPredicate {
    /// Register `AND(BOOLEAN, BOOLEAN)`, `OR(BOOLEAN, BOOLEAN)` and `NOT(BOOLEAN)`
    pub fn init_builtins(catalog: &FunctionCatalog) {
        catalog.add_builtin(Function::builtin_operator(
            CompoundOperator::And.as_str(),
            "CompoundPredicate",
            "AndComputeFn",
            vec![DataType::Boolean, DataType::Boolean],
            DataType::Boolean,
            false,
        ));
        catalog.add_builtin(Function::builtin_operator(
            CompoundOperator::Or.as_str(),
            "CompoundPredicate",
            "OrComputeFn",
            vec![DataType::Boolean, DataType::Boolean],
            DataType::Boolean,
            false,
        ));
        catalog.add_builtin(Function::builtin_operator(
            CompoundOperator::Not.as_str(),
            "CompoundPredicate",
            "NotComputeFn",
            vec![DataType::Boolean],
            DataType::Boolean,
            false,
        ));
    }

    /// Create a compound predicate.
    ///
    /// # Panics
    /// If `right` is present for NOT or missing for AND/OR.
    pub fn new(op: CompoundOperator, left: Expr, right: Option<Expr>) -> Self {
        assert!(
            (op == CompoundOperator::Not) == right.is_none(),
            "{} predicate takes exactly {} operand(s)",
            op,
            op.arity()
        );
        let mut children = Vec::with_capacity(op.arity());
        children.push(left);
        children.extend(right);
        Self {
            op,
            children,
            state: ExprState::default(),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::new(CompoundOperator::And, left, Some(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::new(CompoundOperator::Or, left, Some(right))
    }

    pub fn not(operand: Expr) -> Self {
        Self::new(CompoundOperator::Not, operand, None)
    }

    pub fn op(&self) -> CompoundOperator {
        self.op
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    /// Take the node apart into its operator and operands
    pub fn into_parts(self) -> (CompoundOperator, Vec<Expr>) {
        (self.op, self.children)
    }

    /// Builtin resolved during analysis
    pub fn function(&self) -> Option<&Arc<Function>> {
        self.state.function.as_ref()
    }

    pub fn selectivity(&self) -> Selectivity {
        self.state.selectivity
    }

    pub fn is_analyzed(&self) -> bool {
        self.state.analyzed
    }

    /// Analyze the operands, check they are boolean, resolve the operator
    /// and estimate selectivity. A no-op on an analyzed node.
    ///
    /// # Panics
    /// If the catalog has no matching builtin for the operator, or the
    /// builtin does not return BOOLEAN.
    pub fn analyze(&mut self, analyzer: &Analyzer) -> AnalysisResult<()> {
        if self.state.analyzed {
            return Ok(());
        }
        analyze_children(&mut self.children, analyzer)?;

        for child in &self.children {
            let actual = child.data_type();
            if !actual.is_boolean() && !actual.is_null() {
                return Err(AnalysisError::NonBooleanOperand {
                    operand: child.to_sql(),
                    predicate: self.to_sql(),
                    actual,
                });
            }
        }

        let arg_types = child_types(&self.children);
        let function = analyzer
            .builtin_function(self.op.as_str(), &arg_types, CompareMode::IsSupertypeOf)
            .unwrap_or_else(|| {
                panic!(
                    "no builtin {} operator for argument types {:?}",
                    self.op, arg_types
                )
            });
        assert!(
            function.return_type().is_boolean(),
            "builtin {} must return BOOLEAN",
            function
        );
        cast_for_function_call(&mut self.children, &function)?;

        self.state.data_type = DataType::Boolean;
        self.state.function = Some(function);
        self.state.selectivity = self.estimate_selectivity();
        self.state.analyzed = true;
        debug!(
            "analyzed '{}' selectivity={}",
            self.to_sql(),
            self.state.selectivity
        );
        Ok(())
    }

    /// Combine operand estimates assuming independence; unknown if any
    /// operand is unknown.
    fn estimate_selectivity(&self) -> Selectivity {
        let mut operands = Vec::with_capacity(self.children.len());
        for child in &self.children {
            match child.selectivity().value() {
                Some(s) => operands.push(s),
                None => return Selectivity::UNKNOWN,
            }
        }
        let estimate = match (self.op, operands.as_slice()) {
            (CompoundOperator::And, [s0, s1]) => s0 * s1,
            (CompoundOperator::Or, [s0, s1]) => s0 + s1 - s0 * s1,
            (CompoundOperator::Not, [s0]) => 1.0 - s0,
            (op, operands) => unreachable!("{} predicate with {} operands", op, operands.len()),
        };
        Selectivity::new(estimate)
    }

    pub fn to_sql(&self) -> String {
        match self.op {
            CompoundOperator::Not => format!("NOT {}", self.children[0].to_sql()),
            op => format!(
                "{} {} {}",
                self.children[0].to_sql(),
                op,
                self.children[1].to_sql()
            ),
        }
    }

    /// Logical complement as a new tree.
    ///
    /// `NOT x` yields `x`; AND and OR swap and negate both operands, and
    /// operands that bind looser than the new operator are parenthesized.
    pub fn negate(&self) -> Expr {
        match self.op.dual() {
            None => self.children[0].clone(),
            Some(dual) => {
                let mut negated = Expr::Compound(CompoundPredicate::new(
                    dual,
                    self.children[0].negate(),
                    Some(self.children[1].negate()),
                ));
                parenthesize_operands(&mut negated);
                negated
            }
        }
    }

    /// Columns bound by comparison and IN operands, searching nested
    /// compound predicates. Left to right, duplicates kept.
    pub fn bound_slots(&self) -> Vec<&SlotRef> {
        let mut slots = Vec::new();
        for child in &self.children {
            if let Some(pred) = child.as_bound_slot_predicate() {
                slots.extend(pred.bound_slot());
            } else if let Some(combinator) = child.as_logical_combinator() {
                slots.extend(combinator.bound_slots());
            }
        }
        slots
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::CompoundPred
    }
}

impl LogicalCombinator for CompoundPredicate {
    fn bound_slots(&self) -> Vec<&SlotRef> {
        CompoundPredicate::bound_slots(self)
    }
}

impl PartialEq for CompoundPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.children == other.children
    }
}
