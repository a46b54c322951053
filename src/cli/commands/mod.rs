//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`] and share the loaded settings.

pub mod apply;
pub mod cache;
pub mod dispatcher;
pub mod template;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
