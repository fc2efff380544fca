//! Named cleaning policies.
//!
//! A policy is a pure function from one dataset to a new one. The input is
//! never modified, so the original and the cleaned dataset can be compared
//! afterwards (see [`compare`]).

mod comparison;

use std::{fmt, str::FromStr};

use serde::Serialize;
use tracing::info;

pub use comparison::{clean_and_compare, compare, ComparisonResult};

use crate::{
    config::CleaningConfig,
    dataset::ArrowDataset,
    error::{Error, Result},
    transform::{Chain, DropIncomplete, DropSparse, FillNull, FillStrategy, Unique},
};

/// The fixed set of cleaning policies.
///
/// # Example
///
/// ```
/// use bonifica::CleaningPolicy;
///
/// let policy: CleaningPolicy = "method_2".parse().unwrap();
/// assert_eq!(policy, CleaningPolicy::DropSparseColumns);
/// assert_eq!(policy.name(), "drop_sparse_columns");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningPolicy {
    /// Drop every repeat of an earlier row.
    RemoveDuplicates,
    /// Drop columns missing more than the configured percentage.
    DropSparseColumns,
    /// Drop rows missing a value in any configured column.
    DropIncompleteRows,
    /// Mean-fill the numeric column, drop sparse columns, then mode-fill
    /// the categorical column.
    ImputeMeanThenPrune,
}

impl CleaningPolicy {
    /// Every policy, in menu order.
    pub fn all() -> [Self; 4] {
        [
            Self::RemoveDuplicates,
            Self::DropSparseColumns,
            Self::DropIncompleteRows,
            Self::ImputeMeanThenPrune,
        ]
    }

    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "remove_duplicates",
            Self::DropSparseColumns => "drop_sparse_columns",
            Self::DropIncompleteRows => "drop_incomplete_rows",
            Self::ImputeMeanThenPrune => "impute_mean_then_prune",
        }
    }

    /// Legacy menu identifier (`method_1` to `method_4`).
    pub fn legacy_id(self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "method_1",
            Self::DropSparseColumns => "method_2",
            Self::DropIncompleteRows => "method_3",
            Self::ImputeMeanThenPrune => "method_4",
        }
    }

    /// One-line description for menus and reports.
    pub fn description(self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "Remove duplicate rows, keeping the first occurrence",
            Self::DropSparseColumns => "Drop columns whose missing share exceeds the threshold",
            Self::DropIncompleteRows => "Drop rows missing a value in the selected columns",
            Self::ImputeMeanThenPrune => {
                "Fill the numeric column with its mean, drop sparse columns, fill the categorical column with its mode"
            }
        }
    }

    /// The transform chain implementing this policy.
    pub fn chain(self, config: &CleaningConfig) -> Chain {
        match self {
            Self::RemoveDuplicates => Chain::new().then(Unique::all()),
            Self::DropSparseColumns => Chain::new().then(DropSparse::new(config.sparse_threshold)),
            Self::DropIncompleteRows => {
                Chain::new().then(DropIncomplete::new(config.incomplete_columns.iter().cloned()))
            }
            Self::ImputeMeanThenPrune => Chain::new()
                .then(FillNull::new(&config.numeric_column, FillStrategy::Mean))
                .then(DropSparse::new(config.sparse_threshold))
                .then(FillNull::new(&config.categorical_column, FillStrategy::Mode)),
        }
    }

    /// Applies the policy, returning a new dataset.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if a configured column is absent and
    /// `InvalidOperation` if an imputation statistic is undefined.
    pub fn apply(self, dataset: &ArrowDataset, config: &CleaningConfig) -> Result<ArrowDataset> {
        let cleaned = dataset.with_transform(&self.chain(config))?;
        info!(
            policy = self.name(),
            rows_before = dataset.shape().0,
            rows_after = cleaned.shape().0,
            columns_before = dataset.shape().1,
            columns_after = cleaned.shape().1,
            "applied cleaning policy"
        );
        Ok(cleaned)
    }
}

impl fmt::Display for CleaningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CleaningPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .into_iter()
            .find(|p| p.name() == wanted || p.legacy_id() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::all().iter().map(|p| p.name()).collect();
                Error::invalid_config(format!(
                    "unknown cleaning policy '{s}', expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}
