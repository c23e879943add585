//! Function signatures stored in the catalog.

use crate::types::DataType;
use std::fmt;

/// How argument types are compared against a function signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Every argument type must equal the declared parameter type
    IsIdentical,
    /// Every declared parameter type must be a supertype of the argument type
    IsSupertypeOf,
}

/// A builtin function or operator implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Lower-case lookup name
    name: String,
    arg_types: Vec<DataType>,
    return_type: DataType,
    /// The last declared argument type repeats
    has_var_args: bool,
    /// Symbol of the backend compute function
    symbol: String,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        arg_types: Vec<DataType>,
        return_type: DataType,
        has_var_args: bool,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            arg_types,
            return_type,
            has_var_args,
            symbol: symbol.into(),
        }
    }

    /// Create a builtin operator whose compute function lives in `class_name`
    pub fn builtin_operator(
        name: &str,
        class_name: &str,
        fn_name: &str,
        arg_types: Vec<DataType>,
        return_type: DataType,
        has_var_args: bool,
    ) -> Self {
        Self::new(
            name,
            arg_types,
            return_type,
            has_var_args,
            format!("{}::{}", class_name, fn_name),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arg_types(&self) -> &[DataType] {
        &self.arg_types
    }

    pub fn return_type(&self) -> DataType {
        self.return_type
    }

    pub fn has_var_args(&self) -> bool {
        self.has_var_args
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Declared parameter type for argument position `index`
    pub fn arg_type_at(&self, index: usize) -> Option<DataType> {
        match self.arg_types.get(index) {
            Some(t) => Some(*t),
            None if self.has_var_args => self.arg_types.last().copied(),
            None => None,
        }
    }

    /// Check whether `arg_types` can call this function under `mode`
    pub fn matches(&self, arg_types: &[DataType], mode: CompareMode) -> bool {
        if self.has_var_args {
            if arg_types.len() < self.arg_types.len() {
                return false;
            }
        } else if arg_types.len() != self.arg_types.len() {
            return false;
        }

        arg_types.iter().enumerate().all(|(i, actual)| {
            let Some(declared) = self.arg_type_at(i) else {
                return false;
            };
            match mode {
                CompareMode::IsIdentical => declared == *actual,
                CompareMode::IsSupertypeOf => declared.is_supertype_of(*actual),
            }
        })
    }

    /// Two functions share a signature if name, parameters and var-args agree
    pub fn same_signature(&self, other: &Function) -> bool {
        self.name == other.name
            && self.arg_types == other.arg_types
            && self.has_var_args == other.has_var_args
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<&str> = self.arg_types.iter().map(|t| t.to_sql()).collect();
        write!(f, "{}({}", self.name, args.join(", "))?;
        if self.has_var_args {
            write!(f, "...")?;
        }
        write!(f, ") RETURNS {}", self.return_type)
    }
}
