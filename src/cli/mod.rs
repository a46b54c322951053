//! Command-line interface for epicstamp.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{ApplyArgs, Cli, Commands};
pub use commands::{Command, CommandDispatcher, CommandResult};
