//! Error mapping guide:
//! - A failing external command propagates its own exit code.
//! - A program that cannot be found maps to 127; everything else to 1.
//! - Steps wrap their failures in `StepFailure` so the caller can name the step.
use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// External command ran and exited non-zero (or was killed by a signal).
    #[error("command `{command}` failed with {}", describe_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to start `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("i/o error talking to `{command}`: {source}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command `{command}` timed out after {}s", .after.as_secs())]
    TimedOut { command: String, after: Duration },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("installer finished but {target} is still missing")]
    StillMissing { target: String },

    #[error("another shellstrap run is in progress (lock held at {path})")]
    LockHeld { path: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    Message(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// A pipeline step that failed, carrying the step's name for attribution.
#[derive(Debug, Error)]
#[error("step '{step}' failed: {source}")]
pub struct StepFailure {
    pub step: String,
    #[source]
    pub source: BootstrapError,
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert a BootstrapError to the exit code the process should end with.
pub fn exit_code_for_error(e: &BootstrapError) -> u8 {
    match e {
        BootstrapError::CommandFailed { code, .. } => match code {
            Some(c) if (1..=255).contains(c) => *c as u8,
            _ => 1,
        },
        BootstrapError::CommandSpawn { source, .. } => exit_code_for_io_error(source),
        BootstrapError::NotFound { .. } => 127,
        BootstrapError::Io(ioe) => exit_code_for_io_error(ioe),
        BootstrapError::StillMissing { .. }
        | BootstrapError::CommandIo { .. }
        | BootstrapError::TimedOut { .. }
        | BootstrapError::LockHeld { .. }
        | BootstrapError::Message(_) => 1,
    }
}
