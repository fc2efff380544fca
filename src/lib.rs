//! bonifica - Dataset Quality Assessment and Cleaning in Pure Rust
//!
//! Loads a tabular dataset (CSV on disk or behind a URL), reports its
//! quality, cleans it under named policies, compares the result with the
//! original and derives engineered features. Defaults describe the Titanic
//! passenger dataset, but every column name and threshold is configurable.
//!
//! # Design Principles
//!
//! 1. **Immutable datasets** - every operation returns a new
//!    [`ArrowDataset`]; inputs are never modified
//! 2. **Explicit configuration** - thresholds and column names travel in
//!    [`PipelineConfig`], never in process-wide state
//! 3. **Zero-copy** - Arrow `RecordBatch` throughout, untouched columns
//!    are shared
//! 4. **Errors propagate** - undefined statistics and absent columns fail
//!    the whole operation, there are no partial results
//!
//! # Quick Start
//!
//! ```
//! use bonifica::{clean_and_compare, inspect, ArrowDataset, CleaningConfig, CleaningPolicy};
//!
//! let dataset = ArrowDataset::from_csv_str(
//!     "Age,Embarked,Cabin\n22,S,\n,C,C85\n26,S,\n22,S,\n",
//! )
//! .unwrap();
//!
//! let report = inspect(&dataset);
//! assert_eq!(report.total_missing(), 4);
//! assert_eq!(report.duplicate_count, 1);
//!
//! let (cleaned, comparison) = clean_and_compare(
//!     &dataset,
//!     CleaningPolicy::ImputeMeanThenPrune,
//!     &CleaningConfig::default(),
//! )
//! .unwrap();
//! assert!(!cleaned.has_column("Cabin"));
//! assert_eq!(comparison.retention_percentage, 100.0);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::redundant_clone,
        clippy::needless_collect,
        clippy::too_many_lines,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::float_cmp)]

pub mod analysis;
pub mod clean;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod quality;
pub mod source;
pub mod stats;
pub mod transform;
pub mod value;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use analysis::{
    group_stats, summarize, value_counts, ColumnMean, DatasetSummary, GroupStats, TargetSummary,
    ValueCount,
};
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use clean::{clean_and_compare, compare, CleaningPolicy, ComparisonResult};
pub use config::{
    AnalysisConfig, CleaningConfig, FamilyCategory, FeatureConfig, PipelineConfig, QualityConfig,
    SourceConfig,
};
pub use dataset::{ArrowDataset, CsvOptions, Dataset};
pub use error::{Error, Result};
pub use quality::{
    find_duplicates, inspect, ColumnQuality, DuplicateRows, InferredType, NumericStats,
    QualityInspector, QualityReport,
};
pub use source::{DataSource, Origin};
pub use transform::{
    derive_all, feature_chain, Chain, Cut, Drop, DropIncomplete, DropSparse, FamilySize, FillNull,
    FillStrategy, MapCategories, QuantileCut, Transform, Unique,
};
pub use value::Value;
