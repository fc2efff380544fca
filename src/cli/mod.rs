//! bonifica CLI - Dataset Quality Assessment and Cleaning
//!
//! Command-line interface for bonifica operations. Every command reads a
//! CSV given on the command line, or the configured source (local file,
//! then URL) when no input is given.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

mod analysis;
mod basic;
mod clean;
mod quality;

use crate::PipelineConfig;

/// bonifica - Dataset Quality Assessment and Cleaning in Pure Rust
#[derive(Parser)]
#[command(name = "bonifica")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report missing values, types, outliers and duplicate rows
    Inspect {
        /// Path to a CSV file (defaults to the configured source)
        input: Option<PathBuf>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Apply one cleaning policy
    Clean {
        /// Path to a CSV file (defaults to the configured source)
        input: Option<PathBuf>,
        /// Policy name or legacy id (method_1 to method_4)
        #[arg(short, long)]
        policy: String,
        /// Write the cleaned dataset to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format for the comparison (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Apply every cleaning policy and compare the results
    Compare {
        /// Path to a CSV file (defaults to the configured source)
        input: Option<PathBuf>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Derive family size, family category, age group and fare category
    Features {
        /// Path to a CSV file (defaults to the configured source)
        input: Option<PathBuf>,
        /// Write the enriched dataset to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of rows to preview
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },
    /// Dataset summary and target rate by group
    Summary {
        /// Path to a CSV file (defaults to the configured source)
        input: Option<PathBuf>,
        /// Grouping columns (defaults to the configured ones)
        #[arg(short, long)]
        group_by: Vec<String>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// List the cleaning policies
    Policies,
}

fn load_config(path: Option<&PathBuf>) -> crate::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_toml_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

/// Run the bonifica CLI.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Commands::Inspect { input, format } => {
            quality::cmd_inspect(input.as_ref(), &config, &format)
        }
        Commands::Clean {
            input,
            policy,
            output,
            format,
        } => clean::cmd_clean(input.as_ref(), &config, &policy, output.as_ref(), &format),
        Commands::Compare { input, format } => {
            clean::cmd_compare(input.as_ref(), &config, &format)
        }
        Commands::Features {
            input,
            output,
            rows,
        } => analysis::cmd_features(input.as_ref(), &config, output.as_ref(), rows),
        Commands::Summary {
            input,
            group_by,
            format,
        } => analysis::cmd_summary(input.as_ref(), &config, &group_by, &format),
        Commands::Policies => {
            clean::cmd_policies();
            Ok(())
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
