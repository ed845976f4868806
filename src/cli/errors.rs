//! CLI-specific error types
//!
//! All CLI errors are FATAL: `main` prints them and exits non-zero.

use std::fmt;
use std::io;

use crate::codec::CodecError;
use crate::pipeline::PipelineError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/local file)
    IoError,
    /// No service given by flag or environment
    MissingService,
    /// Could not open a store session
    ConnectFailed,
    /// A pipeline operation failed; carries the pipeline's code
    Pipeline(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "NODEGUARD_CLI_CONFIG_ERROR",
            Self::IoError => "NODEGUARD_CLI_IO_ERROR",
            Self::MissingService => "NODEGUARD_CLI_MISSING_SERVICE",
            Self::ConnectFailed => "NODEGUARD_CLI_CONNECT_FAILED",
            Self::Pipeline(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Service missing
    pub fn missing_service() -> Self {
        Self::new(
            CliErrorCode::MissingService,
            "No service given. Pass --service or set DCOS_SERVICE.",
        )
    }

    /// Session could not be established
    pub fn connect_failed(err: StoreError) -> Self {
        Self::new(CliErrorCode::ConnectFailed, err.to_string())
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::config_error(format!("JSON error: {}", e))
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        Self::new(CliErrorCode::Pipeline(e.code()), e.to_string())
    }
}

impl From<CodecError> for CliError {
    fn from(e: CodecError) -> Self {
        PipelineError::from(e).into()
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
