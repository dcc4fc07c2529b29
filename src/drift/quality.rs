//! Data quality signals reported next to the drift scores.

use serde::{Deserialize, Serialize};

use crate::table::Column;

/// Fraction of null cells in a column. An empty column has a null rate of 0.
pub fn null_rate(column: &Column) -> f64 {
    if column.is_empty() {
        return 0.0;
    }
    column.null_count() as f64 / column.len() as f64
}

/// Per-feature quality flags, measured on the current side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityFlags {
    /// Share of non-null current values outside what the baseline covers:
    /// beyond the observed baseline range for numeric features, or an
    /// unseen category for categorical ones.
    pub out_of_range_rate: f64,
    /// Share of non-null current values that do not read as numbers, for
    /// numeric features. Always 0 for categorical features.
    pub type_mismatch_rate: f64,
}

impl QualityFlags {
    /// Build flags from raw counts over `non_null` current cells.
    pub fn from_counts(out_of_range: usize, type_mismatch: usize, non_null: usize) -> Self {
        if non_null == 0 {
            return Self::default();
        }
        let total = non_null as f64;
        Self {
            out_of_range_rate: out_of_range as f64 / total,
            type_mismatch_rate: type_mismatch as f64 / total,
        }
    }

    /// Returns true if no current value was out of range or mistyped.
    pub fn is_clean(&self) -> bool {
        self.out_of_range_rate == 0.0 && self.type_mismatch_rate == 0.0
    }
}
