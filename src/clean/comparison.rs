//! Before/after summary of a cleaning run.

use serde::Serialize;

use super::CleaningPolicy;
use crate::{config::CleaningConfig, dataset::ArrowDataset, error::Result};

/// Shapes and missing totals of an original and a cleaned dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Name of the policy that produced the cleaned dataset.
    pub policy: String,
    /// Rows and columns of the original.
    pub original_shape: (usize, usize),
    /// Rows and columns of the cleaned dataset.
    pub cleaned_shape: (usize, usize),
    /// Missing cells in the original.
    pub original_missing: usize,
    /// Missing cells in the cleaned dataset.
    pub cleaned_missing: usize,
    /// Original rows minus cleaned rows. Negative if rows were added.
    pub rows_removed: i64,
    /// Original columns minus cleaned columns. Negative if columns were
    /// added.
    pub columns_removed: i64,
    /// Cleaned rows as a percentage of original rows, 0 for an empty
    /// original.
    pub retention_percentage: f64,
}

impl ComparisonResult {
    /// Missing cells eliminated by cleaning.
    pub fn missing_removed(&self) -> i64 {
        signed(self.original_missing) - signed(self.cleaned_missing)
    }
}

#[allow(clippy::cast_possible_wrap)]
fn signed(n: usize) -> i64 {
    n as i64
}

/// Compares an original dataset with a cleaned one.
#[allow(clippy::cast_precision_loss)]
pub fn compare(
    original: &ArrowDataset,
    cleaned: &ArrowDataset,
    policy: impl Into<String>,
) -> ComparisonResult {
    let original_shape = original.shape();
    let cleaned_shape = cleaned.shape();

    let retention_percentage = if original_shape.0 == 0 {
        0.0
    } else {
        cleaned_shape.0 as f64 / original_shape.0 as f64 * 100.0
    };

    ComparisonResult {
        policy: policy.into(),
        original_shape,
        cleaned_shape,
        original_missing: original.total_missing(),
        cleaned_missing: cleaned.total_missing(),
        rows_removed: signed(original_shape.0) - signed(cleaned_shape.0),
        columns_removed: signed(original_shape.1) - signed(cleaned_shape.1),
        retention_percentage,
    }
}

/// Applies `policy` and compares the result with the input.
///
/// # Errors
///
/// Propagates the policy's error; nothing is returned on failure.
pub fn clean_and_compare(
    dataset: &ArrowDataset,
    policy: CleaningPolicy,
    config: &CleaningConfig,
) -> Result<(ArrowDataset, ComparisonResult)> {
    let cleaned = policy.apply(dataset, config)?;
    let comparison = compare(dataset, &cleaned, policy.name());
    Ok((cleaned, comparison))
}
