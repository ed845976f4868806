//! CLI module for nodeguard
//!
//! Provides the command-line interface for:
//! - list: Show the node tree under a service root
//! - get: Download a node's content
//! - set: Upload content with diff, confirmation, and backup
//! - delete: Remove a node with confirmation and backup

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, FormatArg};
pub use commands::{build_pipeline, execute, run};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_local_input, write_local_output, LineSource, StdinLines, TerminalConsole};
