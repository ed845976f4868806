//! Terminal and local file I/O
//!
//! - Operator output goes to stdout, logs to stderr
//! - Confirmation reads one line; anything starting with `y`/`Y` is yes
//! - `set` reads its input from a file or, without one, from stdin

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use crate::pipeline::Console;

use super::errors::{CliError, CliResult};

/// Where confirmation answers come from
pub trait LineSource {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl<R: BufRead> LineSource for R {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Process stdin, locked only for the duration of one read
///
/// `set` without a local file reads all of stdin while the console exists,
/// so the console must not hold the lock.
pub struct StdinLines(io::Stdin);

impl LineSource for StdinLines {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.0.read_line(buf)
    }
}

/// Console over a line source and a writer
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
}

impl TerminalConsole<StdinLines, io::Stdout> {
    /// Console on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(StdinLines(io::stdin()), io::stdout())
    }
}

impl<R: LineSource, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: LineSource, W: Write> Console for TerminalConsole<R, W> {
    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)?;
        self.output.flush()
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{} (use --force to skip this prompt) [y/N] ", question)?;
        self.output.flush()?;

        let mut response = String::new();
        if self.input.read_line(&mut response)? == 0 {
            writeln!(self.output)?;
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Failed to read response. Consider using --force to skip confirmation prompts",
            ));
        }

        let confirmed = matches!(response.trim_start().chars().next(), Some('y' | 'Y'));
        writeln!(self.output, "{}", if confirmed { "Confirmed." } else { "Aborted." })?;
        Ok(confirmed)
    }
}

/// Content of `path`, or all of stdin when `None`
pub fn read_local_input(path: Option<&Path>) -> CliResult<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).map_err(|e| {
            CliError::io_error(format!("Failed to access local file {}: {}", path.display(), e))
        }),
        None => {
            let mut content = Vec::new();
            io::stdin().lock().read_to_end(&mut content).map_err(|e| {
                CliError::io_error(format!(
                    "Failed to read from stdin. Did you mean to provide a filename to read from?: {}",
                    e
                ))
            })?;
            Ok(content)
        }
    }
}

/// Write `content` to a local file
pub fn write_local_output(path: &Path, content: &[u8]) -> CliResult<()> {
    fs::write(path, content).map_err(|e| {
        CliError::io_error(format!(
            "Unable to write {} bytes to local file {}: {}",
            content.len(),
            path.display(),
            e
        ))
    })
}
