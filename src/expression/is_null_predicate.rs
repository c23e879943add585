//! `x IS [NOT] NULL` predicates.

use crate::analyzer::Analyzer;
use crate::expression::expr::{analyze_children, Expr, ExprState};
use crate::expression::{AnalysisResult, Selectivity};
use crate::types::DataType;

#[derive(Debug, Clone)]
pub struct IsNullPredicate {
    negated: bool,
    pub(crate) children: Vec<Expr>,
    pub(crate) state: ExprState,
}

impl IsNullPredicate {
    pub fn new(expr: Expr, negated: bool) -> Self {
        Self {
            negated,
            children: vec![expr],
            state: ExprState::default(),
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    /// Accepts an operand of any type
    pub(crate) fn analyze(&mut self, analyzer: &Analyzer) -> AnalysisResult<()> {
        if self.state.analyzed {
            return Ok(());
        }
        analyze_children(&mut self.children, analyzer)?;
        self.state.data_type = DataType::Boolean;
        self.state.selectivity = Selectivity::UNKNOWN;
        self.state.analyzed = true;
        Ok(())
    }

    pub fn to_sql(&self) -> String {
        format!(
            "{} IS {}NULL",
            self.children[0].to_sql(),
            if self.negated { "NOT " } else { "" }
        )
    }

    pub fn negate(&self) -> Expr {
        Expr::IsNull(IsNullPredicate::new(
            self.children[0].clone(),
            !self.negated,
        ))
    }
}

impl PartialEq for IsNullPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.negated == other.negated && self.children == other.children
    }
}
