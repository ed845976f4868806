//! CLI argument definitions using clap
//!
//! Commands:
//! - nodeguard list|ls [-r] [path]
//! - nodeguard get [--format F] <path> [localfile]
//! - nodeguard set|put [--force] [--format F] <path> [localfile]
//! - nodeguard delete [--force] <path>

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::format::{Format, RequestedFormat};

/// nodeguard - Inspect and safely modify coordination-store nodes
#[derive(Parser, Debug)]
#[command(name = "nodeguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log every step as JSON lines on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Coordination store servers, comma-separated (default: localhost:2181)
    #[arg(long, value_delimiter = ',', global = true)]
    pub servers: Vec<String>,

    /// Service whose nodes are operated on
    #[arg(long, env = "DCOS_SERVICE", global = true)]
    pub service: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List entries within a given path
    #[command(alias = "ls")]
    List {
        /// Recurse through the full tree
        #[arg(short, long)]
        recursive: bool,

        /// Path to list children of (default: the service root)
        path: Option<String>,
    },

    /// Download the content of a given entry
    Get {
        /// Format of the stored data, or 'auto' to detect it
        #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,

        /// Path to retrieve
        path: String,

        /// Local file to write data to, or stdout if unspecified
        localfile: Option<PathBuf>,
    },

    /// Store the content of a file in a given entry, overwriting existing data
    #[command(alias = "put")]
    Set {
        /// Skip the confirmation prompt (the backup is still taken)
        #[arg(long)]
        force: bool,

        /// Format of the data to write, or 'auto' to detect it
        ///
        /// With 'auto', input that parses as TaskInfo or TaskStatus JSON is
        /// encoded as proto, even when the stored node is text. Pass
        /// '--format text' to store such JSON verbatim.
        #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,

        /// Path to write or overwrite
        path: String,

        /// Local file containing the data, or stdin if unspecified
        localfile: Option<PathBuf>,
    },

    /// Delete a single entry
    Delete {
        /// Skip the confirmation prompt (the backup is still taken)
        #[arg(long)]
        force: bool,

        /// Path to delete
        path: String,
    },
}

/// `--format` values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Auto,
    Binary,
    Text,
    Proto,
}

impl From<FormatArg> for RequestedFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => RequestedFormat::Auto,
            FormatArg::Binary => RequestedFormat::Fixed(Format::Binary),
            FormatArg::Text => RequestedFormat::Fixed(Format::Text),
            FormatArg::Proto => RequestedFormat::Fixed(Format::StructuredMessage),
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
