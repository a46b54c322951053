//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::cache::CacheArgs;
use super::commands::template::TemplateArgs;

/// epicstamp - Epic templates with `{{variables}}`, stamped out on demand.
#[derive(Debug, Parser)]
#[command(name = "epicstamp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to settings file (overrides the default location)
    #[arg(short, long, global = true, env = "EPICSTAMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Never prompt; missing answers come from EPICSTAMP_PROMPT_* or fail
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create, inspect and edit templates
    Template(TemplateArgs),

    /// Instantiate a template with variable values
    Apply(ApplyArgs),

    /// Inspect and manage the response cache
    Cache(CacheArgs),
}

/// Arguments for the `apply` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ApplyArgs {
    /// Template id
    pub id: String,

    /// Variable value, repeatable
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Fail instead of prompting when a variable has no value
    #[arg(long)]
    pub strict: bool,

    /// Write the payload to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
