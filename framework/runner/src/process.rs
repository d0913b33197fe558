//! Ownership of the subprocess that runs one side of a flow.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use trafic_config::Role;

use crate::error::RunnerError;
use crate::iperf3_binary::{iperf3_path, IPERF3_BIN};
use crate::types::TraficResult;

/// Everything a finished subprocess wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Starts the subprocess for one side of a flow.
pub trait Launcher: Send + Sync + 'static {
    type Process: FlowProcess;

    /// Start the measurement tool with `args`, capturing its output.
    ///
    /// Must be called from within a Tokio runtime.
    fn launch(&self, role: Role, label: &str, args: &[String])
        -> Result<Self::Process, RunnerError>;
}

/// A started subprocess, owned by the task that supervises it.
pub trait FlowProcess: Send + 'static {
    /// The OS process id, if known.
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit and return its captured output.
    ///
    /// Fails with [RunnerError::Execution] if the process exited with a non-zero status or was
    /// terminated by a signal. The returned future is cancel safe: dropping it before completion
    /// and calling [FlowProcess::wait] again does not lose output.
    fn wait(&mut self) -> impl Future<Output = Result<Captured, RunnerError>> + Send;

    /// Send a termination signal without waiting for the process to exit.
    ///
    /// Fails with [RunnerError::Kill] if the process has already been reaped.
    fn start_kill(&mut self) -> Result<(), RunnerError>;
}

/// Launches the iperf3 binary.
#[derive(Debug, Clone)]
pub struct Iperf3Launcher {
    program: PathBuf,
}

impl Default for Iperf3Launcher {
    /// Run `iperf3` as found on the `PATH` when the flow starts.
    fn default() -> Self {
        Self::with_program(IPERF3_BIN)
    }
}

impl Iperf3Launcher {
    /// Resolve the binary once, honouring [crate::prelude::TRAFIC_IPERF3_PATH_ENV].
    pub fn from_env() -> TraficResult<Self> {
        Ok(Self::with_program(iperf3_path()?))
    }

    /// Run another program in place of iperf3. It must accept the iperf3 arguments.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl Launcher for Iperf3Launcher {
    type Process = Iperf3Process;

    fn launch(
        &self,
        role: Role,
        label: &str,
        args: &[String],
    ) -> Result<Self::Process, RunnerError> {
        log::info!(
            "Starting {role} {label}: {} {}",
            self.program.display(),
            args.join(" ")
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        Ok(Iperf3Process {
            program: self.program.display().to_string(),
            child,
            exited: None,
            stdout,
            stderr,
        })
    }
}

/// A running iperf3 process. Its output pipes are drained in the background so the process
/// never blocks on a full pipe.
#[derive(Debug)]
pub struct Iperf3Process {
    program: String,
    child: Child,
    /// Set once the process has been reaped.
    exited: Option<ExitStatus>,
    stdout: Option<JoinHandle<io::Result<Vec<u8>>>>,
    stderr: Option<JoinHandle<io::Result<Vec<u8>>>>,
}

impl FlowProcess for Iperf3Process {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<Captured, RunnerError> {
        log::debug!(
            "Waiting for {} (PID={:?}) to complete",
            self.program,
            self.child.id()
        );

        let status = self.child.wait().await?;
        self.exited = Some(status);
        let stdout = collect(&mut self.stdout).await?;
        let stderr = collect(&mut self.stderr).await?;

        if !status.success() {
            return Err(RunnerError::Execution {
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(Captured { stdout, stderr })
    }

    fn start_kill(&mut self) -> Result<(), RunnerError> {
        if let Some(status) = self.exited {
            return Err(RunnerError::Kill(io::Error::other(format!(
                "process already exited ({status})"
            ))));
        }

        log::info!("Killing {} (PID={:?})", self.program, self.child.id());
        self.child.start_kill().map_err(RunnerError::Kill)
    }
}

fn drain<R>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

/// Await a drain task, leaving it in place if the caller is cancelled.
async fn collect(
    reader: &mut Option<JoinHandle<io::Result<Vec<u8>>>>,
) -> Result<Vec<u8>, RunnerError> {
    let Some(handle) = reader.as_mut() else {
        return Ok(Vec::new());
    };
    let joined = handle.await;
    *reader = None;

    match joined {
        Ok(read) => Ok(read?),
        Err(e) => Err(RunnerError::Io(io::Error::other(e))),
    }
}
