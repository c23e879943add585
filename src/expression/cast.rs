//! Type conversion expressions.

use crate::analyzer::Analyzer;
use crate::expression::expr::{analyze_children, Expr, ExprState};
use crate::expression::{AnalysisError, AnalysisResult, Selectivity};
use crate::types::DataType;

/// `CAST(expr AS type)`, or an implicit conversion inserted by analysis
#[derive(Debug, Clone)]
pub struct CastExpr {
    target: DataType,
    implicit: bool,
    pub(crate) children: Vec<Expr>,
    pub(crate) state: ExprState,
}

impl CastExpr {
    /// Explicit cast written in the query
    pub fn new(child: Expr, target: DataType) -> Self {
        Self {
            target,
            implicit: false,
            children: vec![child],
            state: ExprState::default(),
        }
    }

    /// Implicit cast of an analyzed child; the result is analyzed
    pub(crate) fn implicit(child: Expr, target: DataType) -> Self {
        let selectivity = child.selectivity();
        Self {
            target,
            implicit: true,
            children: vec![child],
            state: ExprState::analyzed(target, selectivity),
        }
    }

    pub fn target(&self) -> DataType {
        self.target
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn child(&self) -> &Expr {
        &self.children[0]
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    pub(crate) fn analyze(&mut self, analyzer: &Analyzer) -> AnalysisResult<()> {
        if self.state.analyzed {
            return Ok(());
        }
        analyze_children(&mut self.children, analyzer)?;

        let from = self.child().data_type();
        if !from.is_castable_to(self.target) {
            return Err(AnalysisError::InvalidCast {
                expr: self.child().to_sql(),
                from,
                to: self.target,
            });
        }
        self.state.data_type = self.target;
        self.state.selectivity = Selectivity::UNKNOWN;
        self.state.analyzed = true;
        Ok(())
    }

    pub fn to_sql(&self) -> String {
        if self.implicit {
            self.child().to_sql()
        } else {
            format!("CAST({} AS {})", self.child().to_sql(), self.target)
        }
    }
}

impl PartialEq for CastExpr {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.implicit == other.implicit
            && self.children == other.children
    }
}
