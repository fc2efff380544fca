//! Cleaning CLI commands.

use std::path::PathBuf;

use super::basic::{is_json, load_dataset, save_dataset, to_json};
use crate::{clean_and_compare, CleaningPolicy, ComparisonResult, PipelineConfig};

/// Apply one policy and print its comparison.
pub(crate) fn cmd_clean(
    input: Option<&PathBuf>,
    config: &PipelineConfig,
    policy: &str,
    output: Option<&PathBuf>,
    format: &str,
) -> crate::Result<()> {
    let json = is_json(format)?;
    let policy: CleaningPolicy = policy.parse()?;
    let dataset = load_dataset(input, config)?;

    let (cleaned, comparison) = clean_and_compare(&dataset, policy, &config.cleaning)?;

    if json {
        println!("{}", to_json(&comparison)?);
    } else {
        println!("Policy: {} ({})", policy, policy.description());
        print_comparisons(std::slice::from_ref(&comparison));
    }

    if let Some(path) = output {
        save_dataset(&cleaned, path)?;
    }
    Ok(())
}

/// Apply every policy to the same input and tabulate the outcomes.
pub(crate) fn cmd_compare(
    input: Option<&PathBuf>,
    config: &PipelineConfig,
    format: &str,
) -> crate::Result<()> {
    let json = is_json(format)?;
    let dataset = load_dataset(input, config)?;

    let comparisons = CleaningPolicy::all()
        .into_iter()
        .map(|policy| clean_and_compare(&dataset, policy, &config.cleaning).map(|(_, c)| c))
        .collect::<crate::Result<Vec<_>>>()?;

    if json {
        println!("{}", to_json(&comparisons)?);
    } else {
        print_comparisons(&comparisons);
    }
    Ok(())
}

/// List the available policies.
pub(crate) fn cmd_policies() {
    for policy in CleaningPolicy::all() {
        println!(
            "{:<24} {:<10} {}",
            policy.name(),
            policy.legacy_id(),
            policy.description()
        );
    }
}

fn print_comparisons(comparisons: &[ComparisonResult]) {
    println!(
        "{:<24} {:>12} {:>12} {:>9} {:>9} {:>9} {:>10}",
        "POLICY", "BEFORE", "AFTER", "ROWS -", "COLS -", "MISSING", "RETAINED%"
    );
    println!("{}", "-".repeat(91));
    for c in comparisons {
        println!(
            "{:<24} {:>12} {:>12} {:>9} {:>9} {:>9} {:>10.1}",
            c.policy,
            format!("{}x{}", c.original_shape.0, c.original_shape.1),
            format!("{}x{}", c.cleaned_shape.0, c.cleaned_shape.1),
            c.rows_removed,
            c.columns_removed,
            format!("{}->{}", c.original_missing, c.cleaned_missing),
            c.retention_percentage
        );
    }
}
