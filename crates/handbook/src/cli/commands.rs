//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Subcommand};

/// A command that operates on one handbook file.
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Path to the handbook file
    pub file: PathBuf,
}

/// Checklist commands.
#[derive(Debug, Subcommand)]
pub enum ChecklistCommand {
    /// List checklist entries with their saved state
    Show {
        /// Path to the handbook file
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check an entry
    Check {
        /// Path to the handbook file
        file: PathBuf,

        /// Entry number, starting at 1
        #[arg(value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        number: usize,
    },

    /// Uncheck an entry
    Uncheck {
        /// Path to the handbook file
        file: PathBuf,

        /// Entry number, starting at 1
        #[arg(value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        number: usize,
    },

    /// Forget the saved checklist
    Reset {
        /// Path to the handbook file
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        file: Option<PathBuf>,
    },
}
