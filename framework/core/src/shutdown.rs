use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::{self, Receiver, Sender};

/// Broadcasts a single stop request to every listener, typically the scheduler's aggregation
/// loop. Cloning the handle shares the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(1).0,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        if let Err(e) = self.sender.send(()) {
            // Will fail if nobody is listening for a shutdown signal, in which case the log message
            // can be ignored.
            log::warn!("Failed to send shutdown signal: {e:?}");
        }
    }

    /// Whether [ShutdownHandle::shutdown] has been called on this handle or one of its clones.
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe(), self.triggered.clone())
    }
}

#[derive(Debug)]
pub struct DelegatedShutdownListener {
    receiver: Receiver<()>,
    triggered: Arc<AtomicBool>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: Receiver<()>, triggered: Arc<AtomicBool>) -> Self {
        Self {
            receiver,
            triggered,
        }
    }

    /// Point in time check if the shutdown signal has been sent, including signals sent before
    /// this listener was created.
    pub fn should_shutdown(&mut self) -> bool {
        if self.triggered.load(Ordering::SeqCst) {
            return true;
        }

        match self.receiver.try_recv() {
            Ok(_) => true,
            Err(broadcast::error::TryRecvError::Closed) => true,
            // If the receiver is empty or lagged then we should not shutdown.
            Err(_) => false,
        }
    }

    /// Wait for the shutdown signal. Resolves immediately if the signal was already sent, and also
    /// resolves once every [ShutdownHandle] has been dropped. It is safe to race this with another
    /// future so that the shutdown signal can be used to cancel other work in progress.
    pub async fn wait_for_shutdown(&mut self) {
        if self.triggered.load(Ordering::SeqCst) {
            return;
        }

        loop {
            match self.receiver.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Closed) => return,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Execution cancelled by shutdown signal".to_string(),
        }
    }
}
