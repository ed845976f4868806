//! Operator interaction seam
//!
//! The pipeline prints diffs and asks for confirmation through [`Console`];
//! the terminal implementation lives in the CLI.

use std::collections::VecDeque;
use std::io;

/// Output sink plus yes/no decision
pub trait Console {
    /// Write raw bytes to the operator
    fn emit(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Ask a yes/no question; `false` unless the operator agrees
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.emit(text.as_bytes())
    }

    fn println(&mut self, line: &str) -> io::Result<()> {
        self.emit(line.as_bytes())?;
        self.emit(b"\n")
    }
}

/// Console with pre-recorded answers, capturing everything printed
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    output: Vec<u8>,
    answers: VecDeque<bool>,
    questions: Vec<String>,
}

impl ScriptedConsole {
    /// Console that answers `answers` in order
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Console that fails if asked anything
    pub fn silent() -> Self {
        Self::default()
    }

    /// Everything printed so far
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Questions asked so far
    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl Console for ScriptedConsole {
    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.questions.push(question.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for '{}'", question),
            )
        })
    }
}
