//! Function catalog holding builtin operator implementations.

pub mod function;

pub use function::{CompareMode, Function};

use crate::expression::{BinaryPredicate, CompoundPredicate, InPredicate};
use crate::types::DataType;
use dashmap::DashMap;
use log::trace;
use std::sync::Arc;

/// Registry of builtin functions, keyed by lower-case name.
///
/// Overloads are kept in registration order; resolution prefers an exact
/// signature and otherwise picks the first overload whose parameters are
/// supertypes of the arguments.
#[derive(Debug, Default)]
pub struct FunctionCatalog {
    functions: DashMap<String, Vec<Arc<Function>>>,
}

impl FunctionCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with every builtin predicate operator registered
    pub fn with_builtins() -> Self {
        let catalog = Self::new();
        CompoundPredicate::init_builtins(&catalog);
        BinaryPredicate::init_builtins(&catalog);
        InPredicate::init_builtins(&catalog);
        catalog
    }

    /// Register a builtin. Returns false if the signature is already present.
    pub fn add_builtin(&self, function: Function) -> bool {
        let mut overloads = self
            .functions
            .entry(function.name().to_string())
            .or_default();
        if overloads.iter().any(|f| f.same_signature(&function)) {
            return false;
        }
        overloads.push(Arc::new(function));
        true
    }

    /// Find the overload of `name` callable with `arg_types`
    pub fn resolve_operator(
        &self,
        name: &str,
        arg_types: &[DataType],
        mode: CompareMode,
    ) -> Option<Arc<Function>> {
        let key = name.to_ascii_lowercase();
        let overloads = self.functions.get(&key)?;

        let exact = overloads
            .iter()
            .find(|f| f.matches(arg_types, CompareMode::IsIdentical));
        let found = match (exact, mode) {
            (Some(f), _) => Some(f),
            (None, CompareMode::IsIdentical) => None,
            (None, CompareMode::IsSupertypeOf) => overloads
                .iter()
                .find(|f| f.matches(arg_types, CompareMode::IsSupertypeOf)),
        };

        trace!(
            "resolve {}({:?}) with {:?} -> {}",
            key,
            arg_types,
            mode,
            found.map_or_else(|| "none".to_string(), |f| f.to_string())
        );
        found.cloned()
    }

    /// Number of overloads registered under `name`
    pub fn num_overloads(&self, name: &str) -> usize {
        self.functions
            .get(&name.to_ascii_lowercase())
            .map_or(0, |overloads| overloads.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_builtin_rejects_duplicates() {
        let catalog = FunctionCatalog::new();
        let f = Function::new("f", vec![DataType::Int], DataType::Int, false, "f");
        assert!(catalog.add_builtin(f.clone()));
        assert!(!catalog.add_builtin(f));
        assert_eq!(catalog.num_overloads("F"), 1);
    }

    #[test]
    fn test_compound_builtins_registered() {
        let catalog = FunctionCatalog::with_builtins();
        for name in ["AND", "OR", "NOT"] {
            assert_eq!(catalog.num_overloads(name), 1, "{}", name);
        }

        let and = catalog
            .resolve_operator(
                "AND",
                &[DataType::Boolean, DataType::Boolean],
                CompareMode::IsSupertypeOf,
            )
            .unwrap();
        assert_eq!(and.return_type(), DataType::Boolean);
        assert_eq!(and.symbol(), "CompoundPredicate::AndComputeFn");

        let not = catalog
            .resolve_operator("not", &[DataType::Null], CompareMode::IsSupertypeOf)
            .unwrap();
        assert_eq!(not.arg_types(), &[DataType::Boolean]);

        assert!(catalog
            .resolve_operator("NOT", &[DataType::Null], CompareMode::IsIdentical)
            .is_none());
        assert!(catalog
            .resolve_operator("OR", &[DataType::Boolean], CompareMode::IsSupertypeOf)
            .is_none());
    }

    #[test]
    fn test_supertype_resolution_prefers_first_compatible() {
        let catalog = FunctionCatalog::with_builtins();

        let eq = catalog
            .resolve_operator(
                "eq",
                &[DataType::Int, DataType::TinyInt],
                CompareMode::IsSupertypeOf,
            )
            .unwrap();
        assert_eq!(eq.arg_types(), &[DataType::Int, DataType::Int]);

        let eq = catalog
            .resolve_operator(
                "eq",
                &[DataType::BigInt, DataType::Double],
                CompareMode::IsSupertypeOf,
            )
            .unwrap();
        assert_eq!(eq.arg_types(), &[DataType::Double, DataType::Double]);

        assert!(catalog
            .resolve_operator(
                "eq",
                &[DataType::String, DataType::Int],
                CompareMode::IsSupertypeOf
            )
            .is_none());
    }

    #[test]
    fn test_unknown_function() {
        let catalog = FunctionCatalog::with_builtins();
        assert!(catalog
            .resolve_operator("xor", &[DataType::Boolean], CompareMode::IsSupertypeOf)
            .is_none());
    }
}
