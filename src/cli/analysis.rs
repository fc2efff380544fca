//! Feature derivation and summary CLI commands.

use std::path::PathBuf;

use serde::Serialize;

use super::basic::{is_json, load_dataset, print_head, save_dataset, to_json};
use crate::{derive_all, group_stats, summarize, DatasetSummary, GroupStats, PipelineConfig};

/// Derive the configured features, preview them and optionally save.
pub(crate) fn cmd_features(
    input: Option<&PathBuf>,
    config: &PipelineConfig,
    output: Option<&PathBuf>,
    rows: usize,
) -> crate::Result<()> {
    let dataset = load_dataset(input, config)?;
    let enriched = derive_all(&dataset, &config.features)?;

    print_head(&enriched, rows)?;

    if let Some(path) = output {
        save_dataset(&enriched, path)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct GroupTable {
    by: String,
    groups: Vec<GroupStats>,
}

#[derive(Serialize)]
struct SummaryOutput {
    summary: DatasetSummary,
    groups: Vec<GroupTable>,
}

/// Print headline figures and target rates per group.
pub(crate) fn cmd_summary(
    input: Option<&PathBuf>,
    config: &PipelineConfig,
    group_by: &[String],
    format: &str,
) -> crate::Result<()> {
    let json = is_json(format)?;
    let dataset = load_dataset(input, config)?;
    let summary = summarize(&dataset, &config.analysis)?;

    let columns: &[String] = if group_by.is_empty() {
        &config.analysis.group_columns
    } else {
        group_by
    };

    let groups = match &config.analysis.target_column {
        Some(target) => columns
            .iter()
            .map(|by| {
                Ok(GroupTable {
                    by: by.clone(),
                    groups: group_stats(&dataset, by, target)?,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let output = SummaryOutput { summary, groups };
    if json {
        println!("{}", to_json(&output)?);
    } else {
        print_summary(&output);
    }
    Ok(())
}

fn print_summary(output: &SummaryOutput) {
    let s = &output.summary;
    println!("Rows: {}", s.rows);
    println!("Columns: {}", s.columns);
    println!("Missing cells: {}", s.total_missing);
    println!("Duplicate rows: {}", s.duplicate_rows);
    if let Some(target) = &s.target {
        println!(
            "{}: {} of {} positive ({:.1}%)",
            target.column, target.positives, target.count, target.rate
        );
    }
    for mean in &s.means {
        match mean.mean {
            Some(m) => println!("Mean {}: {:.2}", mean.column, m),
            None => println!("Mean {}: n/a", mean.column),
        }
    }

    for table in &output.groups {
        println!();
        println!(
            "{:<16} {:>8} {:>10} {:>8}",
            table.by.to_uppercase(),
            "COUNT",
            "POSITIVE",
            "RATE%"
        );
        for g in &table.groups {
            println!(
                "{:<16} {:>8} {:>10} {:>8.1}",
                g.group.to_string(),
                g.count,
                g.positives,
                g.rate
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::ArrowDataset;

    fn passengers() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            file,
            "Survived,Pclass,Sex,Age,SibSp,Parch,Fare\n\
             0,3,male,22,1,0,7.25\n\
             1,1,female,38,1,0,71.28\n\
             1,3,female,26,0,0,7.92\n\
             1,1,female,35,1,0,53.1\n\
             0,3,male,,0,0,8.05\n"
        )
        .unwrap();
        file
    }

    #[test]
    fn test_cmd_features_writes_enriched_csv() {
        let input = passengers();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("features.csv");
        let path = input.path().to_path_buf();

        cmd_features(Some(&path), &PipelineConfig::default(), Some(&output), 3).unwrap();

        let enriched = ArrowDataset::from_csv(&output).unwrap();
        assert_eq!(enriched.shape(), (5, 11));
        assert!(enriched.has_column("Fare_Category"));
    }

    #[test]
    fn test_cmd_summary() {
        let input = passengers();
        let path = input.path().to_path_buf();
        let config = PipelineConfig::default();
        assert!(cmd_summary(Some(&path), &config, &[], "text").is_ok());
        assert!(cmd_summary(Some(&path), &config, &["Sex".to_string()], "json").is_ok());

        let err = cmd_summary(Some(&path), &config, &["Deck".to_string()], "json").unwrap_err();
        assert!(err.is_schema_mismatch());
    }
}
