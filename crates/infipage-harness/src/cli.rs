use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::{HarnessError, Result};
use crate::runner::{init_tracing, run_scenario};
use crate::scenario::Scenario;

/// Exit code when a run's checksum differs from `--expect`.
pub const CHECKSUM_MISMATCH_EXIT: i32 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "infipage-harness",
    about = "Replay pager scenarios headlessly and record deterministic traces",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a scenario and print its summary.
    Run(RunArgs),

    /// Parse and validate a scenario without running it.
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Scenario JSON file.
    pub scenario: PathBuf,

    /// Write the JSONL trace here.
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Fail unless the trace checksum matches.
    #[arg(long)]
    pub expect: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Scenario JSON file.
    pub scenario: PathBuf,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_command(&args),
        Commands::Validate(args) => {
            let scenario = Scenario::from_path(&args.scenario)?;
            println!(
                "{}",
                serde_json::json!({
                    "status": "ok",
                    "scenario": scenario.name,
                    "pagers": scenario.pagers.len(),
                    "steps": scenario.steps.len(),
                })
            );
            Ok(())
        }
    }
}

fn run_command(args: &RunArgs) -> Result<()> {
    let scenario = Scenario::from_path(&args.scenario)?;
    let report = run_scenario(&scenario)?;
    if let Some(path) = &args.trace {
        report.trace.write_to(path)?;
        tracing::info!(path = %path.display(), "trace written");
    }
    println!(
        "{}",
        serde_json::json!({
            "status": "ok",
            "scenario": report.scenario,
            "checksum": report.checksum,
            "final_pages": report.final_pages,
            "elapsed_ms": report.elapsed_ms,
        })
    );
    match &args.expect {
        Some(expected) if *expected != report.checksum => Err(HarnessError::exit(
            CHECKSUM_MISMATCH_EXIT,
            format!("checksum mismatch: expected {expected}, got {}", report.checksum),
        )),
        _ => Ok(()),
    }
}
