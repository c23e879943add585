//! Expression tree nodes and the protocol shared by every expression kind.

use crate::analyzer::Analyzer;
use crate::catalog::Function;
use crate::expression::{
    AnalysisError, AnalysisResult, BinaryOperator, BinaryPredicate, CastExpr, CompoundPredicate,
    InPredicate, IsNullPredicate, LiteralExpr, Selectivity, SlotRef,
};
use crate::types::{DataType, Value};
use crate::wire::NodeType;
use std::sync::Arc;

/// Binding strength of predicates (comparisons, IN, IS NULL) in rendered SQL
const PREDICATE_PRECEDENCE: u8 = 4;
/// Binding strength of leaves and function-call style expressions
const ATOM_PRECEDENCE: u8 = 5;

/// Analysis state carried by every expression node
#[derive(Debug, Clone, Default)]
pub struct ExprState {
    pub(crate) data_type: DataType,
    pub(crate) selectivity: Selectivity,
    pub(crate) function: Option<Arc<Function>>,
    pub(crate) analyzed: bool,
    pub(crate) print_sql_in_parens: bool,
}

impl ExprState {
    /// State of a node that is analyzed on construction
    pub(crate) fn analyzed(data_type: DataType, selectivity: Selectivity) -> Self {
        Self {
            data_type,
            selectivity,
            analyzed: true,
            ..Self::default()
        }
    }
}

/// Predicates that may constrain a single column
pub trait BoundSlotPredicate {
    /// The column this predicate is bound to, if one side is a column and the
    /// rest is constant
    fn bound_slot(&self) -> Option<&SlotRef>;
}

/// Logical combinators whose operands can be searched for bound columns
pub trait LogicalCombinator {
    /// Columns bound by the operands, left to right, duplicates kept
    fn bound_slots(&self) -> Vec<&SlotRef>;
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant value
    Literal(LiteralExpr),
    /// Column reference
    SlotRef(SlotRef),
    /// Type conversion
    Cast(CastExpr),
    /// Comparison of two operands
    Binary(BinaryPredicate),
    /// `x [NOT] IN (...)`
    In(InPredicate),
    /// `x IS [NOT] NULL`
    IsNull(IsNullPredicate),
    /// AND, OR, NOT
    Compound(CompoundPredicate),
}

impl Expr {
    /// Create a literal expression
    pub fn literal(value: Value) -> Self {
        Expr::Literal(LiteralExpr::new(value))
    }

    pub fn null() -> Self {
        Self::literal(Value::Null)
    }

    pub fn bool(val: bool) -> Self {
        Self::literal(Value::Boolean(val))
    }

    pub fn int(val: i64) -> Self {
        Self::literal(Value::Int(val))
    }

    pub fn float(val: f64) -> Self {
        Self::literal(Value::Float(val))
    }

    pub fn string(val: impl Into<String>) -> Self {
        Self::literal(Value::String(val.into()))
    }

    /// Create a column reference expression
    pub fn column(label: impl Into<String>) -> Self {
        Expr::SlotRef(SlotRef::new(label))
    }

    /// Create an explicit CAST expression
    pub fn cast(expr: Expr, target: DataType) -> Self {
        Expr::Cast(CastExpr::new(expr, target))
    }

    /// Create a comparison expression
    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryPredicate::new(op, left, right))
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Ne, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Lt, left, right)
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Le, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Gt, left, right)
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Ge, left, right)
    }

    /// Create an IN expression
    pub fn in_list(expr: Expr, list: Vec<Expr>) -> Self {
        Expr::In(InPredicate::new(expr, list, false))
    }

    /// Create a NOT IN expression
    pub fn not_in_list(expr: Expr, list: Vec<Expr>) -> Self {
        Expr::In(InPredicate::new(expr, list, true))
    }

    pub fn is_null(expr: Expr) -> Self {
        Expr::IsNull(IsNullPredicate::new(expr, false))
    }

    pub fn is_not_null(expr: Expr) -> Self {
        Expr::IsNull(IsNullPredicate::new(expr, true))
    }

    /// Create an AND expression
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::Compound(CompoundPredicate::and(left, right))
    }

    /// Create an OR expression
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Compound(CompoundPredicate::or(left, right))
    }

    /// Create a NOT expression
    pub fn not(operand: Expr) -> Self {
        Expr::Compound(CompoundPredicate::not(operand))
    }

    pub(crate) fn state(&self) -> &ExprState {
        match self {
            Expr::Literal(e) => &e.state,
            Expr::SlotRef(e) => &e.state,
            Expr::Cast(e) => &e.state,
            Expr::Binary(e) => &e.state,
            Expr::In(e) => &e.state,
            Expr::IsNull(e) => &e.state,
            Expr::Compound(e) => &e.state,
        }
    }

    pub(crate) fn state_mut(&mut self) -> &mut ExprState {
        match self {
            Expr::Literal(e) => &mut e.state,
            Expr::SlotRef(e) => &mut e.state,
            Expr::Cast(e) => &mut e.state,
            Expr::Binary(e) => &mut e.state,
            Expr::In(e) => &mut e.state,
            Expr::IsNull(e) => &mut e.state,
            Expr::Compound(e) => &mut e.state,
        }
    }

    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::Literal(_) | Expr::SlotRef(_) => &[],
            Expr::Cast(e) => e.children(),
            Expr::Binary(e) => e.children(),
            Expr::In(e) => e.children(),
            Expr::IsNull(e) => e.children(),
            Expr::Compound(e) => e.children(),
        }
    }

    /// Result type; `DataType::Invalid` before analysis
    pub fn data_type(&self) -> DataType {
        self.state().data_type
    }

    pub fn selectivity(&self) -> Selectivity {
        self.state().selectivity
    }

    /// Override the estimate of an analyzed node
    #[cfg(test)]
    pub(crate) fn set_selectivity(&mut self, selectivity: Selectivity) {
        self.state_mut().selectivity = selectivity;
    }

    /// Catalog function resolved during analysis
    pub fn function(&self) -> Option<&Arc<Function>> {
        self.state().function.as_ref()
    }

    pub fn is_analyzed(&self) -> bool {
        self.state().analyzed
    }

    pub fn print_sql_in_parens(&self) -> bool {
        self.state().print_sql_in_parens
    }

    /// Render this node wrapped in parentheses
    pub fn set_print_sql_in_parens(&mut self, value: bool) {
        self.state_mut().print_sql_in_parens = value;
    }

    /// Analyze this expression and, first, all of its children.
    ///
    /// A no-op on an analyzed node.
    pub fn analyze(&mut self, analyzer: &Analyzer) -> AnalysisResult<()> {
        if self.is_analyzed() {
            return Ok(());
        }
        match self {
            Expr::Literal(e) => {
                e.analyze();
                Ok(())
            }
            Expr::SlotRef(e) => e.analyze(analyzer),
            Expr::Cast(e) => e.analyze(analyzer),
            Expr::Binary(e) => e.analyze(analyzer),
            Expr::In(e) => e.analyze(analyzer),
            Expr::IsNull(e) => e.analyze(analyzer),
            Expr::Compound(e) => e.analyze(analyzer),
        }
    }

    /// Render as SQL text
    pub fn to_sql(&self) -> String {
        let sql = match self {
            Expr::Literal(e) => e.to_sql(),
            Expr::SlotRef(e) => e.to_sql(),
            Expr::Cast(e) => e.to_sql(),
            Expr::Binary(e) => e.to_sql(),
            Expr::In(e) => e.to_sql(),
            Expr::IsNull(e) => e.to_sql(),
            Expr::Compound(e) => e.to_sql(),
        };
        if self.print_sql_in_parens() {
            format!("({})", sql)
        } else {
            sql
        }
    }

    /// Build the logical complement of this expression as a new tree
    pub fn negate(&self) -> Expr {
        match self {
            Expr::Binary(e) => e.negate(),
            Expr::In(e) => e.negate(),
            Expr::IsNull(e) => e.negate(),
            Expr::Compound(e) => e.negate(),
            Expr::Literal(_) | Expr::SlotRef(_) | Expr::Cast(_) => Expr::not(self.clone()),
        }
    }

    /// True if the expression references no columns
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            Expr::SlotRef(_) => false,
            _ => self.children().iter().all(Expr::is_constant),
        }
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Expr::depth).max().unwrap_or(0)
    }

    /// True if `depth()` is greater than `limit`. Visits at most `limit + 1`
    /// levels, so it is safe on trees too deep to walk fully.
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        match limit.checked_sub(1) {
            None => true,
            Some(rest) => self.children().iter().any(|child| child.exceeds_depth(rest)),
        }
    }

    /// Skip over implicit casts inserted during analysis
    pub fn ignore_implicit_cast(&self) -> &Expr {
        match self {
            Expr::Cast(cast) if cast.is_implicit() => cast.child().ignore_implicit_cast(),
            other => other,
        }
    }

    /// The column this expression reads directly, looking through implicit casts
    pub fn unwrap_slot_ref(&self) -> Option<&SlotRef> {
        match self.ignore_implicit_cast() {
            Expr::SlotRef(slot) => Some(slot),
            _ => None,
        }
    }

    /// Implicitly cast an analyzed expression to `target`.
    ///
    /// Literals are retyped in place; anything else is wrapped in an
    /// implicit `CastExpr`. Only widening conversions are allowed.
    pub fn cast_to(self, target: DataType) -> AnalysisResult<Expr> {
        let from = self.data_type();
        if from == target {
            return Ok(self);
        }
        if !target.is_supertype_of(from) {
            return Err(AnalysisError::InvalidCast {
                expr: self.to_sql(),
                from,
                to: target,
            });
        }
        match self {
            Expr::Literal(literal) => Ok(Expr::Literal(literal.retype(target))),
            other => Ok(Expr::Cast(CastExpr::implicit(other, target))),
        }
    }

    /// Tag identifying the node kind in serialized plans
    pub fn node_type(&self) -> NodeType {
        match self {
            Expr::Literal(e) => e.node_type(),
            Expr::SlotRef(_) => NodeType::SlotRef,
            Expr::Cast(_) => NodeType::CastExpr,
            Expr::Binary(_) => NodeType::BinaryPred,
            Expr::In(_) => NodeType::InPred,
            Expr::IsNull(_) => NodeType::IsNullPred,
            Expr::Compound(e) => e.node_type(),
        }
    }

    /// Binding strength in rendered SQL; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Compound(e) => e.op().precedence(),
            Expr::Binary(_) | Expr::In(_) | Expr::IsNull(_) => PREDICATE_PRECEDENCE,
            Expr::Literal(_) | Expr::SlotRef(_) | Expr::Cast(_) => ATOM_PRECEDENCE,
        }
    }

    pub fn as_bound_slot_predicate(&self) -> Option<&dyn BoundSlotPredicate> {
        match self {
            Expr::Binary(e) => Some(e),
            Expr::In(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_logical_combinator(&self) -> Option<&dyn LogicalCombinator> {
        match self {
            Expr::Compound(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundPredicate> {
        match self {
            Expr::Compound(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LiteralExpr> for Expr {
    fn from(e: LiteralExpr) -> Self {
        Expr::Literal(e)
    }
}

impl From<SlotRef> for Expr {
    fn from(e: SlotRef) -> Self {
        Expr::SlotRef(e)
    }
}

impl From<BinaryPredicate> for Expr {
    fn from(e: BinaryPredicate) -> Self {
        Expr::Binary(e)
    }
}

impl From<InPredicate> for Expr {
    fn from(e: InPredicate) -> Self {
        Expr::In(e)
    }
}

impl From<CompoundPredicate> for Expr {
    fn from(e: CompoundPredicate) -> Self {
        Expr::Compound(e)
    }
}

/// Analyze every child, left to right
pub(crate) fn analyze_children(children: &mut [Expr], analyzer: &Analyzer) -> AnalysisResult<()> {
    for child in children.iter_mut() {
        child.analyze(analyzer)?;
    }
    Ok(())
}

pub(crate) fn child_types(children: &[Expr]) -> Vec<DataType> {
    children.iter().map(Expr::data_type).collect()
}

/// Cast each child to the parameter type `function` declares for its position
pub(crate) fn cast_for_function_call(
    children: &mut [Expr],
    function: &Function,
) -> AnalysisResult<()> {
    for (i, child) in children.iter_mut().enumerate() {
        let Some(target) = function.arg_type_at(i) else {
            continue;
        };
        let from = child.data_type();
        if from == target {
            continue;
        }
        if !target.is_supertype_of(from) {
            return Err(AnalysisError::InvalidCast {
                expr: child.to_sql(),
                from,
                to: target,
            });
        }
        let original = std::mem::replace(child, Expr::null());
        *child = original.cast_to(target)?;
    }
    Ok(())
}

/// Mark operands of a compound node that bind looser than the node itself,
/// so the rendered SQL keeps the tree's meaning.
pub(crate) fn parenthesize_operands(expr: &mut Expr) {
    let Expr::Compound(compound) = expr else {
        return;
    };
    let precedence = compound.op().precedence();
    for child in compound.children.iter_mut() {
        if child.precedence() < precedence {
            child.set_print_sql_in_parens(true);
        }
    }
}
