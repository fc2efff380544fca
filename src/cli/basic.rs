//! Shared CLI helpers: loading, saving and printing datasets.

use std::path::{Path, PathBuf};

use arrow::util::pretty::print_batches;
use serde::Serialize;

use crate::{ArrowDataset, DataSource, Dataset, PipelineConfig};

/// Load the dataset named on the command line, or the configured source.
pub(crate) fn load_dataset(
    input: Option<&PathBuf>,
    config: &PipelineConfig,
) -> crate::Result<ArrowDataset> {
    match input {
        Some(path) => {
            check_csv(path)?;
            ArrowDataset::from_csv(path)
        }
        None => {
            let (dataset, origin) = DataSource::from(&config.source).load()?;
            eprintln!("Loaded {} rows from {}", dataset.len(), origin);
            Ok(dataset)
        }
    }
}

/// Save a dataset as CSV.
pub(crate) fn save_dataset(dataset: &ArrowDataset, path: &Path) -> crate::Result<()> {
    check_csv(path)?;
    dataset.to_csv(path)?;
    println!("Wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

fn check_csv(path: &Path) -> crate::Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(()),
        Some(ext) => Err(crate::Error::unsupported_format(ext)),
        None => Err(crate::Error::unsupported_format("<none>")),
    }
}

/// Print the first `rows` rows with Arrow's pretty printer.
pub(crate) fn print_head(dataset: &ArrowDataset, rows: usize) -> crate::Result<()> {
    if dataset.is_empty() {
        println!("Dataset is empty");
        return Ok(());
    }

    let mut collected = Vec::new();
    let mut count = 0;

    for batch in dataset.iter() {
        let take = (rows - count).min(batch.num_rows());
        if take > 0 {
            collected.push(batch.slice(0, take));
            count += take;
        }
        if count >= rows {
            break;
        }
    }

    if collected.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    print_batches(&collected).map_err(crate::Error::Arrow)?;

    if count < dataset.len() {
        println!("... showing {} of {} rows", count, dataset.len());
    }

    Ok(())
}

/// Pretty JSON for any serializable report.
pub(crate) fn to_json<T: Serialize>(value: &T) -> crate::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| crate::Error::Format(e.to_string()))
}

/// Reject unknown `--format` values early.
pub(crate) fn is_json(format: &str) -> crate::Result<bool> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(crate::Error::invalid_config(format!(
            "unknown output format '{}', expected text or json",
            other
        ))),
    }
}
