//! Pipeline configuration.
//!
//! Every threshold, column name and bin table the pipeline uses lives here
//! and is passed explicitly into the operations that need it. Defaults
//! describe the Titanic passenger dataset. A configuration can be loaded
//! from TOML; omitted keys keep their defaults.
//!
//! ```toml
//! [cleaning]
//! sparse_threshold = 40.0
//! incomplete_columns = ["Age"]
//!
//! [features]
//! fare_labels = ["Cheap", "Mid", "Dear"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Remote copy of the Titanic training set.
pub const TITANIC_URL: &str =
    "https://raw.githubusercontent.com/FabriceGhislain7/data_analyst_scientist/main/titanic_project/data_titanic.csv";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Where the dataset comes from.
    pub source: SourceConfig,
    /// Quality inspection settings.
    pub quality: QualityConfig,
    /// Cleaning policy parameters.
    pub cleaning: CleaningConfig,
    /// Feature derivation settings.
    pub features: FeatureConfig,
    /// Dataset summary settings.
    pub analysis: AnalysisConfig,
}

impl PipelineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed TOML and `InvalidConfig` if a value is
    /// out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::parse(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_toml_str(&content)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        let q = &self.quality;
        if !(0.0..=1.0).contains(&q.lower_quantile)
            || !(0.0..=1.0).contains(&q.upper_quantile)
            || q.lower_quantile > q.upper_quantile
        {
            return Err(Error::invalid_config(format!(
                "outlier quantiles must satisfy 0 <= lower <= upper <= 1, got {} and {}",
                q.lower_quantile, q.upper_quantile
            )));
        }
        if q.iqr_factor < 0.0 {
            return Err(Error::invalid_config("iqr_factor must not be negative"));
        }

        let threshold = self.cleaning.sparse_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(Error::invalid_config(format!(
                "sparse_threshold must be a percentage, got {threshold}"
            )));
        }

        let f = &self.features;
        if f.age_bins.len() != f.age_labels.len() + 1 {
            return Err(Error::invalid_config(format!(
                "{} age bins need {} labels, got {}",
                f.age_bins.len(),
                f.age_bins.len().saturating_sub(1),
                f.age_labels.len()
            )));
        }
        if f.fare_labels.is_empty() {
            return Err(Error::invalid_config("fare_labels must not be empty"));
        }

        Ok(())
    }
}

/// Dataset location: a local path tried first, then a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Local CSV path.
    pub path: Option<PathBuf>,
    /// Remote CSV URL, used when the local file is absent.
    pub url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("data/data_titanic.csv")),
            url: Some(TITANIC_URL.to_string()),
        }
    }
}

/// Quality inspection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// A string column with fewer distinct values than this is categorical.
    pub categorical_threshold: usize,
    /// Number of non-missing sample values kept per column.
    pub sample_size: usize,
    /// Lower quantile of the outlier fence.
    pub lower_quantile: f64,
    /// Upper quantile of the outlier fence.
    pub upper_quantile: f64,
    /// IQR multiplier of the outlier fence.
    pub iqr_factor: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            categorical_threshold: 10,
            sample_size: 3,
            lower_quantile: 0.25,
            upper_quantile: 0.75,
            iqr_factor: 1.5,
        }
    }
}

impl QualityConfig {
    /// Sets the categorical threshold.
    #[must_use]
    pub fn with_categorical_threshold(mut self, threshold: usize) -> Self {
        self.categorical_threshold = threshold;
        self
    }

    /// Sets the sample size.
    #[must_use]
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Sets the IQR multiplier.
    #[must_use]
    pub fn with_iqr_factor(mut self, factor: f64) -> Self {
        self.iqr_factor = factor;
        self
    }
}

/// Parameters of the cleaning policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Columns missing more than this percentage are dropped.
    pub sparse_threshold: f64,
    /// Columns that must be complete for a row to survive.
    pub incomplete_columns: Vec<String>,
    /// Column filled with its mean.
    pub numeric_column: String,
    /// Column filled with its mode.
    pub categorical_column: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            sparse_threshold: 50.0,
            incomplete_columns: vec!["Age".to_string(), "Embarked".to_string()],
            numeric_column: "Age".to_string(),
            categorical_column: "Embarked".to_string(),
        }
    }
}

impl CleaningConfig {
    /// Sets the sparse column threshold in percent.
    #[must_use]
    pub fn with_sparse_threshold(mut self, threshold: f64) -> Self {
        self.sparse_threshold = threshold;
        self
    }

    /// Sets the columns checked for completeness.
    #[must_use]
    pub fn with_incomplete_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.incomplete_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the mean- and mode-imputed columns.
    #[must_use]
    pub fn with_imputed_columns(
        mut self,
        numeric: impl Into<String>,
        categorical: impl Into<String>,
    ) -> Self {
        self.numeric_column = numeric.into();
        self.categorical_column = categorical.into();
        self
    }
}

/// One row of the family size lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyCategory {
    /// Label written for matching sizes.
    pub label: String,
    /// Family sizes carrying this label.
    pub sizes: Vec<i64>,
}

impl FamilyCategory {
    fn new(label: &str, sizes: &[i64]) -> Self {
        Self {
            label: label.to_string(),
            sizes: sizes.to_vec(),
        }
    }
}

/// Feature derivation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Siblings/spouses count column.
    pub siblings_column: String,
    /// Parents/children count column.
    pub parents_column: String,
    /// Output column for family size.
    pub family_size_column: String,
    /// Family size labels. Empty disables the family category column.
    pub family_categories: Vec<FamilyCategory>,
    /// Output column for the family category.
    pub family_category_column: String,
    /// Age column.
    pub age_column: String,
    /// Age bin boundaries.
    pub age_bins: Vec<f64>,
    /// One label per age bin.
    pub age_labels: Vec<String>,
    /// Output column for the age group.
    pub age_group_column: String,
    /// Fare column.
    pub fare_column: String,
    /// One label per fare quantile bin.
    pub fare_labels: Vec<String>,
    /// Output column for the fare category.
    pub fare_category_column: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            siblings_column: "SibSp".to_string(),
            parents_column: "Parch".to_string(),
            family_size_column: "Family_Size".to_string(),
            family_categories: vec![
                FamilyCategory::new("Solo", &[1]),
                FamilyCategory::new("Small", &[2, 3]),
                FamilyCategory::new("Medium", &[4]),
                FamilyCategory::new("Large", &[5, 6, 7, 8]),
            ],
            family_category_column: "Family_Category".to_string(),
            age_column: "Age".to_string(),
            age_bins: vec![0.0, 12.0, 25.0, 40.0, 80.0],
            age_labels: ["Child (0-12)", "Young (13-25)", "Adult (26-40)", "Senior (41+)"]
                .map(String::from)
                .to_vec(),
            age_group_column: "Age_Group".to_string(),
            fare_column: "Fare".to_string(),
            fare_labels: ["Low", "Medium", "High", "Very High"]
                .map(String::from)
                .to_vec(),
            fare_category_column: "Fare_Category".to_string(),
        }
    }
}

/// Dataset summary settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Binary target column (1 = positive).
    pub target_column: Option<String>,
    /// Numeric columns whose means the summary reports.
    pub mean_columns: Vec<String>,
    /// Grouping columns for target-rate tables.
    pub group_columns: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_column: Some("Survived".to_string()),
            mean_columns: vec!["Age".to_string(), "Fare".to_string()],
            group_columns: vec!["Sex".to_string(), "Pclass".to_string()],
        }
    }
}
