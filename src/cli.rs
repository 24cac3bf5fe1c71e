// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: A single optional level argument plus run-mode flags.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reclaim")]
#[command(about = "Reclaim disk space from Docker, Kubernetes and Minikube")]
#[command(version)]
pub struct Cli {
    /// Cleanup level: 1 (regular) or 2 (aggressive)
    #[arg(value_name = "LEVEL", default_value = "1")]
    pub level: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Probe and print the plan without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file (default: $RECLAIM_CONFIG, then ./reclaim.yml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print warnings, errors and the final report
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
