//! Constant expressions.

use crate::expression::expr::ExprState;
use crate::types::{DataType, Value};
use crate::wire::NodeType;

/// Literal value in an expression
#[derive(Debug, Clone)]
pub struct LiteralExpr {
    value: Value,
    pub(crate) state: ExprState,
}

impl LiteralExpr {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            state: ExprState::default(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn analyze(&mut self) {
        if self.state.analyzed {
            return;
        }
        self.state.data_type = self.value.data_type();
        self.state.analyzed = true;
    }

    /// Give the literal a wider type. Integers become floats for FLOAT/DOUBLE.
    pub(crate) fn retype(mut self, target: DataType) -> Self {
        if let (Value::Int(v), DataType::Float | DataType::Double) = (&self.value, target) {
            self.value = Value::Float(*v as f64);
        }
        self.state.data_type = target;
        self.state.analyzed = true;
        self
    }

    pub fn to_sql(&self) -> String {
        self.value.to_sql()
    }

    pub(crate) fn node_type(&self) -> NodeType {
        match self.value {
            Value::Null => NodeType::NullLiteral,
            Value::Boolean(_) => NodeType::BoolLiteral,
            Value::Int(_) => NodeType::IntLiteral,
            Value::Float(_) => NodeType::FloatLiteral,
            Value::String(_) => NodeType::StringLiteral,
        }
    }
}

impl PartialEq for LiteralExpr {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_analysis() {
        let mut lit = LiteralExpr::new(Value::Int(300));
        lit.analyze();
        assert_eq!(lit.state.data_type, DataType::SmallInt);

        let mut null = LiteralExpr::new(Value::Null);
        null.analyze();
        assert_eq!(null.state.data_type, DataType::Null);
    }

    #[test]
    fn test_retype() {
        let lit = LiteralExpr::new(Value::Int(2)).retype(DataType::Double);
        assert_eq!(lit.value(), &Value::Float(2.0));
        assert_eq!(lit.state.data_type, DataType::Double);

        let null = LiteralExpr::new(Value::Null).retype(DataType::Boolean);
        assert_eq!(null.value(), &Value::Null);
        assert_eq!(null.state.data_type, DataType::Boolean);
        assert_eq!(null.to_sql(), "NULL");
        assert_eq!(null.node_type(), NodeType::NullLiteral);
    }
}
