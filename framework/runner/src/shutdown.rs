use tokio::signal;
use trafic_core::prelude::ShutdownHandle;

/// Trigger the returned handle when the process receives Ctrl-C.
pub(crate) fn start_shutdown_listener(runtime: &tokio::runtime::Runtime) -> ShutdownHandle {
    let handle = ShutdownHandle::default();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C, shutdown must come from elsewhere: {e}");
            return;
        }
        log::info!("Received shutdown signal, shutting down...");
        listener_handle.shutdown();
    });

    handle
}
