//! Quality inspection CLI command.

use std::path::PathBuf;

use super::basic::{is_json, load_dataset, to_json};
use crate::{PipelineConfig, QualityInspector, QualityReport};

/// Inspect a dataset and print its quality report.
pub(crate) fn cmd_inspect(
    input: Option<&PathBuf>,
    config: &PipelineConfig,
    format: &str,
) -> crate::Result<()> {
    let json = is_json(format)?;
    let dataset = load_dataset(input, config)?;
    let report = QualityInspector::with_config(config.quality.clone()).inspect(&dataset);

    if json {
        println!("{}", to_json(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &QualityReport) {
    println!("Data Quality Report");
    println!("===================");
    println!("Rows: {}", report.row_count);
    println!("Columns: {}", report.column_count);
    println!("Missing cells: {}", report.total_missing());
    println!("Duplicate rows: {}", report.duplicate_count);
    println!();

    println!(
        "{:<16} {:<12} {:>8} {:>9} {:>8} {:>9}  SAMPLE",
        "COLUMN", "TYPE", "MISSING", "MISSING%", "UNIQUE", "OUTLIERS"
    );
    println!("{}", "-".repeat(86));

    for col in &report.columns {
        let outliers = col
            .outlier_count
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let sample: Vec<String> = col.sample_values.iter().map(|v| v.to_string()).collect();
        println!(
            "{:<16} {:<12} {:>8} {:>9.2} {:>8} {:>9}  {}",
            col.name,
            col.inferred_type.to_string(),
            col.missing_count,
            col.missing_percentage,
            col.unique_count,
            outliers,
            sample.join(", ")
        );
    }

    let missing = report.columns_with_missing();
    if !missing.is_empty() {
        println!();
        println!("Columns with missing values:");
        for col in missing {
            println!(
                "  {:<16} {:>6} ({:.1}%)",
                col.name, col.missing_count, col.missing_percentage
            );
        }
    }

    let numeric: Vec<_> = report
        .columns
        .iter()
        .filter_map(|c| c.numeric_stats.as_ref().map(|s| (&c.name, s)))
        .collect();
    if !numeric.is_empty() {
        println!();
        println!(
            "{:<16} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "NUMERIC", "MIN", "Q1", "MEDIAN", "MEAN", "Q3", "MAX"
        );
        for (name, s) in numeric {
            println!(
                "{:<16} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                name, s.min, s.q1, s.median, s.mean, s.q3, s.max
            );
        }
    }
}
