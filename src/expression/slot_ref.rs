//! Column references.

use crate::analyzer::{Analyzer, ColumnStats, SlotId};
use crate::expression::expr::ExprState;
use crate::expression::{AnalysisError, AnalysisResult};
use log::trace;

/// Reference to a column, resolved to a slot during analysis
#[derive(Debug, Clone)]
pub struct SlotRef {
    label: String,
    slot_id: Option<SlotId>,
    stats: ColumnStats,
    pub(crate) state: ExprState,
}

impl SlotRef {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            slot_id: None,
            stats: ColumnStats::default(),
            state: ExprState::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Slot this reference resolved to; `None` before analysis
    pub fn slot_id(&self) -> Option<SlotId> {
        self.slot_id
    }

    /// Statistics of the referenced column, copied during analysis
    pub fn stats(&self) -> ColumnStats {
        self.stats
    }

    pub(crate) fn analyze(&mut self, analyzer: &Analyzer) -> AnalysisResult<()> {
        if self.state.analyzed {
            return Ok(());
        }
        let desc = analyzer
            .slot_descriptor(&self.label)
            .ok_or_else(|| AnalysisError::UnknownColumn(self.label.clone()))?;
        trace!("resolved column '{}' to {:?}", self.label, desc.id);

        self.slot_id = Some(desc.id);
        self.stats = desc.stats;
        self.state.data_type = desc.data_type;
        self.state.analyzed = true;
        Ok(())
    }

    pub fn to_sql(&self) -> String {
        self.label.clone()
    }
}

impl PartialEq for SlotRef {
    fn eq(&self, other: &Self) -> bool {
        match (self.slot_id, other.slot_id) {
            (Some(a), Some(b)) => a == b,
            _ => self.label.eq_ignore_ascii_case(&other.label),
        }
    }
}
