//! `x [NOT] IN (a, b, ...)` predicates.

use crate::analyzer::Analyzer;
use crate::catalog::{CompareMode, Function, FunctionCatalog};
use crate::expression::expr::{
    analyze_children, cast_for_function_call, child_types, BoundSlotPredicate, Expr, ExprState,
};
use crate::expression::{AnalysisError, AnalysisResult, Selectivity, SlotRef};
use crate::types::DataType;
use log::debug;

const IN_TYPES: [DataType; 9] = [
    DataType::Boolean,
    DataType::TinyInt,
    DataType::SmallInt,
    DataType::Int,
    DataType::BigInt,
    DataType::Float,
    DataType::Double,
    DataType::String,
    DataType::Timestamp,
];

/// Membership test; child 0 is the tested value, the rest is the list
#[derive(Debug, Clone)]
pub struct InPredicate {
    negated: bool,
    pub(crate) children: Vec<Expr>,
    pub(crate) state: ExprState,
}

impl InPredicate {
    pub fn init_builtins(catalog: &FunctionCatalog) {
        for t in IN_TYPES {
            catalog.add_builtin(Function::builtin_operator(
                "in",
                "InPredicate",
                &format!("in_iterate_{}", t.to_sql().to_ascii_lowercase()),
                vec![t],
                DataType::Boolean,
                true,
            ));
        }
    }

    /// Panics if `list` is empty.
    pub fn new(expr: Expr, list: Vec<Expr>, negated: bool) -> Self {
        assert!(!list.is_empty(), "IN predicate requires a non-empty list");
        let mut children = Vec::with_capacity(list.len() + 1);
        children.push(expr);
        children.extend(list);
        Self {
            negated,
            children,
            state: ExprState::default(),
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    pub fn list(&self) -> &[Expr] {
        &self.children[1..]
    }

    pub(crate) fn analyze(&mut self, analyzer: &Analyzer) -> AnalysisResult<()> {
        if self.state.analyzed {
            return Ok(());
        }
        analyze_children(&mut self.children, analyzer)?;

        let arg_types = child_types(&self.children);
        let function = analyzer
            .builtin_function("in", &arg_types, CompareMode::IsSupertypeOf)
            .ok_or_else(|| AnalysisError::IncompatibleInList {
                expr: self.to_sql(),
            })?;
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

    /// A bound list selects `len / ndv` of the rows; NOT IN the rest
    fn estimate_selectivity(&self) -> Selectivity {
        let ndv = match self.bound_slot().and_then(|slot| slot.stats().ndv) {
            Some(ndv) if ndv > 0 => ndv,
            _ => return Selectivity::UNKNOWN,
        };
        let selectivity = Selectivity::new(self.list().len() as f64 / ndv as f64);
        match (self.negated, selectivity.value()) {
            (true, Some(s)) => Selectivity::new(1.0 - s),
            _ => selectivity,
        }
    }

    pub fn to_sql(&self) -> String {
        let list: Vec<String> = self.list().iter().map(Expr::to_sql).collect();
        format!(
            "{} {}IN ({})",
            self.children[0].to_sql(),
            if self.negated { "NOT " } else { "" },
            list.join(", ")
        )
    }

    /// Same list with IN and NOT IN swapped
    pub fn negate(&self) -> Expr {
        Expr::In(InPredicate::new(
            self.children[0].clone(),
            self.list().to_vec(),
            !self.negated,
        ))
    }
}

impl BoundSlotPredicate for InPredicate {
    fn bound_slot(&self) -> Option<&SlotRef> {
        let slot = self.children[0].unwrap_slot_ref()?;
        if self.list().iter().all(Expr::is_constant) {
            Some(slot)
        } else {
            None
        }
    }
}

impl PartialEq for InPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.negated == other.negated && self.children == other.children
    }
}
