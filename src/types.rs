//! SQL data types and constant values used by the expression layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data types an expression can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    /// Type of an expression that has not been analyzed yet
    #[default]
    Invalid,
    /// Type of an untyped NULL literal
    Null,
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    String,
    Timestamp,
}

impl DataType {
    /// Numeric types in widening order.
    const NUMERIC_ORDER: [DataType; 6] = [
        DataType::TinyInt,
        DataType::SmallInt,
        DataType::Int,
        DataType::BigInt,
        DataType::Float,
        DataType::Double,
    ];

    pub fn is_boolean(&self) -> bool {
        matches!(self, DataType::Boolean)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataType::Null)
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, DataType::Invalid)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    fn numeric_rank(&self) -> Option<usize> {
        Self::NUMERIC_ORDER.iter().position(|t| t == self)
    }

    /// Returns true if a value of type `other` can be implicitly widened to `self`.
    ///
    /// NULL_TYPE widens to every valid type; numeric types widen along
    /// TINYINT < SMALLINT < INT < BIGINT < FLOAT < DOUBLE. Nothing narrows.
    pub fn is_supertype_of(&self, other: DataType) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        if *self == other || other.is_null() {
            return true;
        }
        match (self.numeric_rank(), other.numeric_rank()) {
            (Some(target), Some(source)) => source <= target,
            _ => false,
        }
    }

    /// Returns true if an explicit CAST from `self` to `target` is allowed
    pub fn is_castable_to(&self, target: DataType) -> bool {
        if !self.is_valid() || !target.is_valid() || target.is_null() {
            return false;
        }
        if self.is_null() || *self == target || target == DataType::String {
            return true;
        }
        match (*self, target) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (DataType::Boolean, b) if b.is_numeric() => true,
            (a, DataType::Boolean) if a.is_numeric() => true,
            (DataType::String, b) => b.is_numeric() || b == DataType::Timestamp,
            _ => false,
        }
    }

    /// SQL name of this type, as shown in error messages
    pub fn to_sql(&self) -> &'static str {
        match self {
            DataType::Invalid => "INVALID_TYPE",
            DataType::Null => "NULL_TYPE",
            DataType::Boolean => "BOOLEAN",
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::String => "STRING",
            DataType::Timestamp => "TIMESTAMP",
        }
    }

    /// Parse a SQL type name (case-insensitive)
    pub fn from_sql(name: &str) -> Option<Self> {
        let data_type = match name.to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "TINYINT" => DataType::TinyInt,
            "SMALLINT" => DataType::SmallInt,
            "INT" | "INTEGER" => DataType::Int,
            "BIGINT" => DataType::BigInt,
            "FLOAT" => DataType::Float,
            "DOUBLE" => DataType::Double,
            "STRING" | "VARCHAR" => DataType::String,
            "TIMESTAMP" => DataType::Timestamp,
            _ => return None,
        };
        Some(data_type)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// Constant values that can appear in an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Narrowest data type that holds this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Boolean(_) => DataType::Boolean,
            Value::Int(v) => {
                if i8::try_from(*v).is_ok() {
                    DataType::TinyInt
                } else if i16::try_from(*v).is_ok() {
                    DataType::SmallInt
                } else if i32::try_from(*v).is_ok() {
                    DataType::Int
                } else {
                    DataType::BigInt
                }
            }
            Value::Float(_) => DataType::Double,
            Value::String(_) => DataType::String,
        }
    }

    /// Render this value as a SQL literal
    pub fn to_sql(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Boolean(true) => "TRUE".to_string(),
            Value::Boolean(false) => "FALSE".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => format!("{:?}", v),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}
