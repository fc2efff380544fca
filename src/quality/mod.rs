//! Data quality inspection.
//!
//! Profiles every column of a dataset (missing values, distinct values,
//! inferred type, sample values, numeric statistics and IQR outliers) and
//! finds duplicate rows. Reports are snapshots: inspecting never changes
//! the dataset, and a changed dataset needs a fresh report.
//!
//! # Example
//!
//! ```
//! use bonifica::{ArrowDataset, QualityConfig, QualityInspector};
//!
//! let dataset = ArrowDataset::from_csv_str("Age,Embarked\n22,S\n,C\n22,S\n").unwrap();
//! let inspector = QualityInspector::with_config(QualityConfig::default());
//! let report = inspector.inspect(&dataset);
//!
//! assert_eq!(report.column("Age").map(|c| c.missing_count), Some(1));
//! assert_eq!(report.duplicate_indices, vec![2]);
//! ```

mod checks;

#[cfg(test)]
mod tests;

pub(crate) use checks::frequencies;
pub use checks::{
    find_duplicates, inspect, ColumnQuality, DuplicateRows, InferredType, NumericStats,
    QualityInspector, QualityReport,
};
pub use crate::config::QualityConfig;
