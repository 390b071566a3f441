//! tsconfig-graph
//!
//! Prints the graph of TypeScript projects under a directory, or one of its
//! reverse indices, as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tsconfig_graph::cli::{Cli, Command};
use tsconfig_graph::config::ConfigLoader;
use tsconfig_graph::output::to_json;
use tsconfig_graph::{build_graph, map_files, map_references};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging based on --log and --verbose. RUST_LOG wins when set.
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)
                .with_context(|| format!("cannot open log file {}", filename))?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

/// Build the requested artifact and render it as JSON.
async fn run(cli: Cli) -> Result<String> {
    let args = cli.command.args();

    let current_dir = std::env::current_dir().context("cannot determine current directory")?;
    let base_dir: PathBuf = match &args.cwd {
        Some(cwd) => current_dir.join(cwd),
        None => current_dir,
    };

    let mut loader = match &args.config {
        Some(path) => ConfigLoader::load_explicit(path)?,
        None => ConfigLoader::load(&base_dir)?,
    };
    for (tier, path) in loader.sources() {
        debug!(tier = %tier, path = ?path, "Settings tier applied");
    }
    args.apply(loader.settings_mut());
    let settings = loader.into_settings();

    let options = settings.to_build_options(Some(base_dir), args.tsconfig_files.clone());
    let graph = build_graph(&options).await?;

    let json = match &cli.command {
        Command::Build(_) => to_json(&graph, settings.pretty)?,
        Command::MapFiles(_) => to_json(&map_files(&graph), settings.pretty)?,
        Command::MapReferences(_) => to_json(&map_references(&graph), settings.pretty)?,
    };
    Ok(json)
}
