//! Analysis context: resolvable columns, the function catalog and limits.

use crate::catalog::{CompareMode, Function, FunctionCatalog};
use crate::expression::{AnalysisError, AnalysisResult, Expr};
use crate::types::DataType;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default limit on the depth of an analyzed expression tree
pub const DEFAULT_MAX_EXPR_DEPTH: usize = 1000;

/// Identifier of a column slot within an analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

/// Precomputed column statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnStats {
    /// Number of distinct values
    pub ndv: Option<u64>,
}

impl ColumnStats {
    pub fn with_ndv(ndv: u64) -> Self {
        Self { ndv: Some(ndv) }
    }
}

/// A column that slot references can resolve to
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDescriptor {
    pub id: SlotId,
    pub label: String,
    pub data_type: DataType,
    pub stats: ColumnStats,
}

/// Analyzer limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Deepest expression tree accepted by [`Analyzer::analyze`]
    pub max_expr_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_expr_depth: DEFAULT_MAX_EXPR_DEPTH,
        }
    }
}

/// Context expressions are analyzed in
pub struct Analyzer {
    catalog: Arc<FunctionCatalog>,
    slots: Vec<SlotDescriptor>,
    /// Lower-case label -> index into `slots`
    slots_by_label: HashMap<String, usize>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(catalog: Arc<FunctionCatalog>) -> Self {
        Self::with_config(catalog, AnalyzerConfig::default())
    }

    pub fn with_config(catalog: Arc<FunctionCatalog>, config: AnalyzerConfig) -> Self {
        Self {
            catalog,
            slots: Vec::new(),
            slots_by_label: HashMap::new(),
            config,
        }
    }

    /// Make a column resolvable by label (case-insensitive).
    ///
    /// Registering an existing label replaces its type and stats but keeps
    /// its slot id.
    pub fn register_column(
        &mut self,
        label: impl Into<String>,
        data_type: DataType,
        stats: ColumnStats,
    ) -> SlotId {
        let label = label.into();
        let key = label.to_ascii_lowercase();
        if let Some(&index) = self.slots_by_label.get(&key) {
            let desc = &mut self.slots[index];
            desc.data_type = data_type;
            desc.stats = stats;
            return desc.id;
        }

        let id = SlotId(self.slots.len() as u32);
        debug!("registered column '{}' as {} ({})", label, id, data_type);
        self.slots.push(SlotDescriptor {
            id,
            label,
            data_type,
            stats,
        });
        self.slots_by_label.insert(key, self.slots.len() - 1);
        id
    }

    pub fn slot_descriptor(&self, label: &str) -> Option<&SlotDescriptor> {
        self.slots_by_label
            .get(&label.to_ascii_lowercase())
            .map(|&index| &self.slots[index])
    }

    pub fn slot(&self, id: SlotId) -> Option<&SlotDescriptor> {
        self.slots.get(id.0 as usize)
    }

    /// Look up a builtin in the catalog
    pub fn builtin_function(
        &self,
        name: &str,
        arg_types: &[DataType],
        mode: CompareMode,
    ) -> Option<Arc<Function>> {
        self.catalog.resolve_operator(name, arg_types, mode)
    }

    /// Analyze `expr` bottom-up after checking the depth limit
    pub fn analyze(&self, expr: &mut Expr) -> AnalysisResult<()> {
        if expr.exceeds_depth(self.config.max_expr_depth) {
            return Err(AnalysisError::ExprTooDeep {
                limit: self.config.max_expr_depth,
            });
        }
        expr.analyze(self)
    }
}
