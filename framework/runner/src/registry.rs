//! Handles to the subprocesses the scheduler currently has in flight.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use trafic_config::Role;

use crate::error::{RunnerError, TeardownError};

/// Reply channel the supervising task uses to report the outcome of a kill request.
pub(crate) type KillAck = oneshot::Sender<Result<(), RunnerError>>;

/// Live handle to one running flow process.
///
/// The process itself is owned by the task supervising it. The handle only carries a kill switch
/// into that task, so it can be shared freely and outlive the process.
#[derive(Debug)]
pub struct RunHandle {
    label: String,
    role: Role,
    pid: Option<u32>,
    kill_switch: Mutex<Option<oneshot::Sender<KillAck>>>,
}

impl RunHandle {
    pub(crate) fn new(
        label: impl Into<String>,
        role: Role,
        pid: Option<u32>,
    ) -> (Self, oneshot::Receiver<KillAck>) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            label: label.into(),
            role,
            pid,
            kill_switch: Mutex::new(Some(tx)),
        };
        (handle, rx)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Ask the supervising task to terminate the process and wait for it to confirm the signal
    /// was sent.
    ///
    /// Only the first call can succeed. Later calls, and calls made after the process has exited,
    /// return an error without touching any process.
    pub async fn kill(&self) -> Result<(), TeardownError> {
        let Some(switch) = self.kill_switch.lock().take() else {
            return Err(TeardownError::AlreadySignalled {
                label: self.label.clone(),
                role: self.role,
            });
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        if switch.send(ack_tx).is_err() {
            return Err(self.already_exited());
        }

        match ack_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(TeardownError::Kill {
                label: self.label.clone(),
                role: self.role,
                source,
            }),
            Err(_) => Err(self.already_exited()),
        }
    }

    fn already_exited(&self) -> TeardownError {
        TeardownError::AlreadyExited {
            label: self.label.clone(),
            role: self.role,
        }
    }
}

/// Label-indexed set of the flows currently running.
#[derive(Debug, Default)]
pub struct RunRegistry {
    inner: Mutex<HashMap<String, Arc<RunHandle>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle. Returns false, leaving the registry unchanged, if a flow with the same
    /// label is already registered.
    pub(crate) fn insert(&self, handle: Arc<RunHandle>) -> bool {
        let mut inner = self.inner.lock();
        if inner.contains_key(handle.label()) {
            return false;
        }
        inner.insert(handle.label().to_string(), handle);
        true
    }

    /// Remove `handle`, but only if it is the entry registered under its label.
    pub(crate) fn remove(&self, handle: &Arc<RunHandle>) -> bool {
        let mut inner = self.inner.lock();
        match inner.get(handle.label()) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                inner.remove(handle.label());
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, label: &str) -> Option<Arc<RunHandle>> {
        self.inner.lock().get(label).cloned()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.inner.lock().contains_key(label)
    }

    /// Every registered handle, ordered by label.
    pub fn snapshot(&self) -> Vec<Arc<RunHandle>> {
        let mut handles = self.inner.lock().values().cloned().collect::<Vec<_>>();
        handles.sort_by(|a, b| a.label().cmp(b.label()));
        handles
    }

    pub fn labels(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|h| h.label().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
