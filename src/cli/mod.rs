//! CLI command definitions for tsconfig-graph
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod args;

use args::GraphArgs;
use clap::{Parser, Subcommand};

/// Map TypeScript projects, their files and project references
#[derive(Parser, Debug)]
#[command(name = "tsconfig-graph", author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the tsconfig graph
    Build(GraphArgs),

    /// Print each file with the tsconfigs that include it
    MapFiles(GraphArgs),

    /// Print each referenced tsconfig with the tsconfigs that reference it
    MapReferences(GraphArgs),
}

impl Command {
    /// Arguments shared by every subcommand.
    pub fn args(&self) -> &GraphArgs {
        match self {
            Command::Build(args) | Command::MapFiles(args) | Command::MapReferences(args) => args,
        }
    }
}
