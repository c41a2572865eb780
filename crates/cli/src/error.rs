//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: core error (bad dimensions, distance field build failure)
//! - 11: I/O error (PNG write, seed file)
//! - 12: input error (unknown preset, bad JSON params)
//! - 13: serialization error
//! - 14: mask error (undecodable image, wrong grid size, empty shape field)

use flowlines_core::FlowError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// A core error (bad dimensions, unloaded distance field).
    Core(FlowError),
    /// An I/O error (file read or write).
    Io(String),
    /// A user input error (unknown preset, bad JSON params).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
    /// The `--mask` image could not become a distance field.
    Mask { path: String, source: FlowError },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Mask { .. } => 14,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Core(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
            CliError::Mask { path, source } => write!(f, "mask {path}: {source}"),
        }
    }
}

impl CliError {
    /// Wraps a failure while turning the image at `path` into a shape.
    pub fn mask(path: &str) -> impl FnOnce(FlowError) -> CliError + '_ {
        move |source| CliError::Mask {
            path: path.to_string(),
            source,
        }
    }
}

impl From<FlowError> for CliError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Io(msg) => CliError::Io(msg),
            FlowError::UnknownPreset(_) => CliError::Input(e.to_string()),
            other => CliError::Core(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
