//! Selectivity estimates attached to predicates.

use std::fmt;

/// Estimated fraction of rows that satisfy a predicate.
///
/// Either unknown or a value in [0.0, 1.0]; constructors clamp.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Selectivity(Option<f64>);

impl Selectivity {
    /// No estimate available
    pub const UNKNOWN: Selectivity = Selectivity(None);

    /// Raw value used for "unknown" in serialized plans
    pub const UNKNOWN_RAW: f64 = -1.0;

    /// Create an estimate, clamping into [0.0, 1.0]. NaN is treated as unknown.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::UNKNOWN;
        }
        Selectivity(Some(value.clamp(0.0, 1.0)))
    }

    /// Convert from the raw form, where any negative value means unknown
    pub fn from_raw(raw: f64) -> Self {
        if raw < 0.0 {
            Self::UNKNOWN
        } else {
            Self::new(raw)
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    /// Raw form: the estimate, or -1.0 if unknown
    pub fn as_raw(&self) -> f64 {
        self.0.unwrap_or(Self::UNKNOWN_RAW)
    }
}

impl fmt::Display for Selectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.4}", v),
            None => write!(f, "unknown"),
        }
    }
}
