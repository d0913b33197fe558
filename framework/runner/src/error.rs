use std::io;
use std::process::ExitStatus;

use trafic_config::{ArgsError, ConfigError, Role};
use trafic_core::prelude::ShutdownSignalError;
use trafic_cruncher::CrunchError;

/// Failure of a single subprocess.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("cannot start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("process exited abnormally ({status}): {stderr}")]
    Execution { status: ExitStatus, stderr: String },
    #[error("cannot signal process: {0}")]
    Kill(#[source] io::Error),
    #[error("cannot collect process output: {0}")]
    Io(#[from] io::Error),
}

/// A kill attempt made on a [crate::prelude::RunHandle] that did not signal the process. Only
/// ever logged by the scheduler's teardown.
#[derive(Debug, thiserror::Error)]
pub enum TeardownError {
    #[error("{role} {label} has already been signalled")]
    AlreadySignalled { label: String, role: Role },
    #[error("{role} {label} has already exited")]
    AlreadyExited { label: String, role: Role },
    #[error("cannot kill {role} {label}: {source}")]
    Kill {
        label: String,
        role: Role,
        #[source]
        source: RunnerError,
    },
}

/// Failure of one flow, as carried by its status report.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("cannot build arguments: {0}")]
    Args(#[from] ArgsError),
    #[error("a flow with the same label is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Runner(#[from] RunnerError),
    /// The process succeeded but its output could not be normalized. The captured output is
    /// kept in `raw`.
    #[error("cannot crunch output: {source}")]
    Crunch {
        #[source]
        source: CrunchError,
        raw: Vec<u8>,
    },
}

impl FlowError {
    /// The captured standard output, when the flow ran to completion.
    pub fn raw_output(&self) -> Option<&[u8]> {
        match self {
            FlowError::Crunch { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Failure of a whole batch of flows.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid flow set: {0}")]
    InvalidFlows(#[from] ConfigError),
    #[error("{role} {label} failed: {source}")]
    FlowFailed {
        label: String,
        role: Role,
        #[source]
        source: FlowError,
    },
    #[error("batch stopped: {0}")]
    Cancelled(#[from] ShutdownSignalError),
    #[error("{outstanding} flow(s) stopped without reporting a status")]
    Lost { outstanding: usize },
}
