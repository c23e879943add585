//! Comparison predicates (`=`, `!=`, `<`, `<=`, `>`, `>=`).

use crate::analyzer::Analyzer;
use crate::catalog::{CompareMode, Function, FunctionCatalog};
use crate::expression::expr::{
    analyze_children, cast_for_function_call, child_types, BoundSlotPredicate, Expr, ExprState,
};
use crate::expression::{AnalysisError, AnalysisResult, BinaryOperator, Selectivity, SlotRef};
use crate::types::DataType;
use log::debug;

/// Types with comparison builtins, in the order resolution tries them
const COMPARABLE_TYPES: [DataType; 9] = [
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

/// Comparison of two operands
#[derive(Debug, Clone)]
pub struct BinaryPredicate {
    op: BinaryOperator,
    pub(crate) children: Vec<Expr>,
    pub(crate) state: ExprState,
}

impl BinaryPredicate {
    /// Register one overload per operator and comparable type
    pub fn init_builtins(catalog: &FunctionCatalog) {
        for op in BinaryOperator::ALL {
            for t in COMPARABLE_TYPES {
                let type_name = t.to_sql().to_ascii_lowercase();
                catalog.add_builtin(Function::builtin_operator(
                    op.function_name(),
                    "BinaryPredicate",
                    &format!("{}_{}_{}", op.function_name(), type_name, type_name),
                    vec![t, t],
                    DataType::Boolean,
                    false,
                ));
            }
        }
    }

    pub fn new(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Self {
            op,
            children: vec![left, right],
            state: ExprState::default(),
        }
    }

    pub fn op(&self) -> BinaryOperator {
        self.op
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    pub(crate) fn analyze(&mut self, analyzer: &Analyzer) -> AnalysisResult<()> {
        if self.state.analyzed {
            return Ok(());
        }
        analyze_children(&mut self.children, analyzer)?;

        let arg_types = child_types(&self.children);
        let function = analyzer
            .builtin_function(
                self.op.function_name(),
                &arg_types,
                CompareMode::IsSupertypeOf,
            )
            .ok_or_else(|| AnalysisError::IncomparableOperands {
                left: arg_types[0],
                right: arg_types[1],
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

    /// Equality on a bound column selects one distinct value out of NDV
    fn estimate_selectivity(&self) -> Selectivity {
        if self.op != BinaryOperator::Eq {
            return Selectivity::UNKNOWN;
        }
        match self.bound_slot().and_then(|slot| slot.stats().ndv) {
            Some(ndv) if ndv > 0 => Selectivity::new(1.0 / ndv as f64),
            _ => Selectivity::UNKNOWN,
        }
    }

    pub fn to_sql(&self) -> String {
        format!(
            "{} {} {}",
            self.children[0].to_sql(),
            self.op,
            self.children[1].to_sql()
        )
    }

    /// Comparison with the complementary operator over the same operands
    pub fn negate(&self) -> Expr {
        Expr::Binary(BinaryPredicate::new(
            self.op.negate(),
            self.children[0].clone(),
            self.children[1].clone(),
        ))
    }
}

impl BoundSlotPredicate for BinaryPredicate {
    fn bound_slot(&self) -> Option<&SlotRef> {
        let (left, right) = (&self.children[0], &self.children[1]);
        if let Some(slot) = left.unwrap_slot_ref() {
            if right.is_constant() {
                return Some(slot);
            }
        }
        if let Some(slot) = right.unwrap_slot_ref() {
            if left.is_constant() {
                return Some(slot);
            }
        }
        None
    }
}

impl PartialEq for BinaryPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.children == other.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ColumnStats;
    use std::sync::Arc;

    fn analyzer() -> Analyzer {
        let mut analyzer = Analyzer::new(Arc::new(FunctionCatalog::with_builtins()));
        analyzer.register_column("id", DataType::Int, ColumnStats::with_ndv(4));
        analyzer.register_column("total", DataType::BigInt, ColumnStats::default());
        analyzer.register_column("name", DataType::String, ColumnStats::default());
        analyzer
    }

    #[test]
    fn test_equality_selectivity() {
        let analyzer = analyzer();

        let mut expr = Expr::eq(Expr::column("id"), Expr::int(7));
        expr.analyze(&analyzer).unwrap();
        assert_eq!(expr.selectivity().value(), Some(0.25));

        // Reversed operands are still bound
        let mut expr = Expr::eq(Expr::int(7), Expr::column("id"));
        expr.analyze(&analyzer).unwrap();
        assert_eq!(expr.selectivity().value(), Some(0.25));

        let mut expr = Expr::lt(Expr::column("id"), Expr::int(7));
        expr.analyze(&analyzer).unwrap();
        assert_eq!(expr.selectivity(), Selectivity::UNKNOWN);

        // No stats
        let mut expr = Expr::eq(Expr::column("total"), Expr::int(7));
        expr.analyze(&analyzer).unwrap();
        assert_eq!(expr.selectivity(), Selectivity::UNKNOWN);
    }

    #[test]
    fn test_implicit_widening() {
        let analyzer = analyzer();
        let mut expr = Expr::eq(Expr::column("id"), Expr::column("total"));
        expr.analyze(&analyzer).unwrap();

        let Expr::Binary(pred) = &expr else {
            panic!("expected binary predicate");
        };
        assert!(matches!(&pred.children()[0], Expr::Cast(c) if c.is_implicit()));
        assert_eq!(pred.children()[0].data_type(), DataType::BigInt);
        assert_eq!(expr.to_sql(), "id = total");
        // Neither side is constant
        assert!(pred.bound_slot().is_none());
    }

    #[test]
    fn test_incomparable_operands() {
        let analyzer = analyzer();
        let mut expr = Expr::eq(Expr::column("name"), Expr::int(5));
        assert_eq!(
            expr.analyze(&analyzer),
            Err(AnalysisError::IncomparableOperands {
                left: DataType::String,
                right: DataType::TinyInt,
                expr: "name = 5".to_string(),
            })
        );
        assert!(!expr.is_analyzed());
    }

    #[test]
    fn test_negate() {
        let expr = Expr::le(Expr::column("id"), Expr::int(3));
        assert_eq!(expr.negate(), Expr::gt(Expr::column("id"), Expr::int(3)));
        assert_eq!(expr.negate().to_sql(), "id > 3");
        assert_eq!(expr.negate().negate(), expr);
    }

    #[test]
    fn test_bound_slot_through_implicit_cast() {
        let analyzer = analyzer();
        let mut expr = Expr::eq(Expr::column("id"), Expr::int(5_000_000_000));
        expr.analyze(&analyzer).unwrap();
        let Expr::Binary(pred) = &expr else {
            panic!("expected binary predicate");
        };
        assert_eq!(pred.bound_slot().unwrap().label(), "id");
        assert_eq!(expr.selectivity().value(), Some(0.25));
    }
}
