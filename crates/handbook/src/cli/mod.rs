//! Command-line interface for handbook.
//!
//! This module provides the CLI structure for the `handbook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ChecklistCommand, ConfigCommand, DocumentArgs, StatusCommand};

/// handbook - A paged handbook for the terminal
///
/// Reads a handbook file one page at a time, with arrow-key and swipe
/// navigation, click-to-copy fields and a checklist that is remembered
/// between sessions.
#[derive(Debug, Parser)]
#[command(name = "handbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a handbook in the terminal reader
    Read(DocumentArgs),

    /// Print the plain-text rendering sent to the printer
    Render(DocumentArgs),

    /// Inspect or change a handbook's saved checklist
    #[command(subcommand)]
    Checklist(ChecklistCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
