// ABOUTME: Entry point for the reclaim CLI application.
// ABOUTME: Parses arguments, sets up tracing, and maps outcomes to exit codes.

mod cli;
mod commands;

use clap::{CommandFactory, Parser};
use cli::Cli;
use reclaim::config::Config;
use reclaim::error::{Error, Result};
use reclaim::output::{Output, OutputMode};
use reclaim::sweep::CleanupLevel;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG overrides the verbose flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    let level: CleanupLevel = match cli.level.parse() {
        Ok(level) => level,
        Err(e) => {
            output.error(&e.to_string());
            eprintln!("{}", Cli::command().render_usage());
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            output.error(&format!("failed to start runtime: {e}"));
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli, level, &output)) {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, level: CleanupLevel, output: &Output) -> Result<()> {
    let cwd = env::current_dir().map_err(Error::Io)?;
    let config = Config::resolve(cli.config.as_deref(), &cwd)?;

    commands::cleanup(level, config, cli.yes, cli.dry_run, output).await?;
    Ok(())
}
