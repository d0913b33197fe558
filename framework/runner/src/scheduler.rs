//! Drives a batch of flows for one role to completion.
//!
//! Every flow gets its own process and a watchdog task that waits for it. Watchdogs report back on
//! a single completion channel, and the first failure they report tears the remaining flows down.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use trafic_config::{validate_flows, FlowConfig, Role, ToArgs};
use trafic_core::prelude::{ShutdownHandle, ShutdownSignalError};
use trafic_cruncher::Cruncher;

use crate::error::{FlowError, RunnerError, ScheduleError};
use crate::process::{Captured, FlowProcess, Launcher};
use crate::registry::{KillAck, RunHandle, RunRegistry};

/// Order flows by their first scheduled offset. Flows with the same offset keep their relative
/// order.
pub fn sort_flows_by_deadline(flows: &[FlowConfig]) -> Vec<&FlowConfig> {
    let mut sorted = flows.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|flow| flow.first_offset());
    sorted
}

/// Outcome of one flow, sent by its watchdog.
#[derive(Debug)]
struct StatusReport {
    label: String,
    role: Role,
    outcome: Result<Vec<u8>, FlowError>,
}

/// Output of a flow that completed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOutput {
    pub label: String,
    pub role: Role,
    pub collector: Option<String>,
    /// The normalized samples when a cruncher is configured, the raw standard output otherwise.
    pub output: Vec<u8>,
}

/// Runs batches of flows for one [Role], launching their processes through `L`.
pub struct Scheduler<L: Launcher> {
    launcher: L,
    role: Role,
    cruncher: Option<Arc<dyn Cruncher>>,
    registry: Arc<RunRegistry>,
    shutdown_handle: ShutdownHandle,
}

impl<L: Launcher> Scheduler<L> {
    pub fn new(launcher: L, role: Role) -> Self {
        Self {
            launcher,
            role,
            cruncher: None,
            registry: Arc::new(RunRegistry::new()),
            shutdown_handle: ShutdownHandle::new(),
        }
    }

    /// Pass the output of every flow through `cruncher` before reporting it.
    pub fn with_cruncher(mut self, cruncher: impl Cruncher + 'static) -> Self {
        self.cruncher = Some(Arc::new(cruncher));
        self
    }

    /// Stop on the shutdown signal of `handle` rather than a private one.
    pub fn with_shutdown(mut self, handle: ShutdownHandle) -> Self {
        self.shutdown_handle = handle;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The flows currently running. Safe to inspect, and to kill entries of, while a batch runs.
    pub fn registry(&self) -> Arc<RunRegistry> {
        self.registry.clone()
    }

    /// Triggering this handle stops the running batch with [ScheduleError::Cancelled].
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown_handle.clone()
    }

    /// Start every flow and wait until all of them have completed.
    ///
    /// Returns the output of each flow in the order the flows completed. The first flow to fail
    /// stops the batch: every flow still running is killed and the failure is returned. A
    /// responder batch never completes on its own and has to be stopped through the
    /// [Scheduler::shutdown_handle].
    pub async fn run(&self, flows: &[FlowConfig]) -> Result<Vec<FlowOutput>, ScheduleError> {
        validate_flows(flows)?;

        let mut shutdown_listener = self.shutdown_handle.new_listener();
        if shutdown_listener.should_shutdown() {
            return Err(ShutdownSignalError::default().into());
        }

        let collectors = flows
            .iter()
            .map(|flow| (flow.label.as_str(), flow.collector.clone()))
            .collect::<HashMap<_, _>>();

        log::info!("Starting {} {} flow(s)", flows.len(), self.role);

        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let mut outstanding = 0;
        for flow in sort_flows_by_deadline(flows) {
            if let Err(source) = self.start_flow(flow, done_tx.clone()) {
                log::error!("Failed to start {} {}: {source}", self.role, flow.label);
                tear_down(&self.registry).await;
                return Err(ScheduleError::FlowFailed {
                    label: flow.label.clone(),
                    role: self.role,
                    source,
                });
            }
            outstanding += 1;
        }
        drop(done_tx);

        let mut outputs = Vec::with_capacity(outstanding);
        while outstanding > 0 {
            tokio::select! {
                report = done_rx.recv() => match report {
                    Some(StatusReport { label, role, outcome: Ok(output) }) => {
                        outstanding -= 1;
                        log::info!("{role} {label} completed, {outstanding} flow(s) left");
                        outputs.push(FlowOutput {
                            collector: collectors.get(label.as_str()).cloned().flatten(),
                            label,
                            role,
                            output,
                        });
                    }
                    Some(StatusReport { label, role, outcome: Err(source) }) => {
                        log::error!("{role} {label} failed: {source}");
                        tear_down(&self.registry).await;
                        return Err(ScheduleError::FlowFailed { label, role, source });
                    }
                    None => {
                        log::error!("Lost track of {outstanding} flow(s)");
                        tear_down(&self.registry).await;
                        return Err(ScheduleError::Lost { outstanding });
                    }
                },
                _ = shutdown_listener.wait_for_shutdown() => {
                    log::info!("Shutdown requested with {outstanding} flow(s) still running");
                    tear_down(&self.registry).await;
                    return Err(ShutdownSignalError::default().into());
                }
            }
        }

        log::info!("All {} {} flow(s) completed", outputs.len(), self.role);
        Ok(outputs)
    }

    fn start_flow(
        &self,
        flow: &FlowConfig,
        done_tx: mpsc::UnboundedSender<StatusReport>,
    ) -> Result<(), FlowError> {
        let args = flow.config_for(self.role).to_args()?;
        if self.registry.contains(&flow.label) {
            return Err(FlowError::AlreadyRunning);
        }

        let process = self.launcher.launch(self.role, &flow.label, &args)?;
        let (handle, kill_rx) = RunHandle::new(flow.label.clone(), self.role, process.id());
        let handle = Arc::new(handle);
        if !self.registry.insert(handle.clone()) {
            // Dropping the process kills it.
            return Err(FlowError::AlreadyRunning);
        }

        tokio::spawn(watchdog(
            process,
            kill_rx,
            handle,
            self.registry.clone(),
            self.cruncher.clone(),
            done_tx,
        ));

        Ok(())
    }
}

/// Best-effort kill of every flow in `registry`. Failures are logged, never returned.
pub async fn tear_down(registry: &RunRegistry) {
    let handles = registry.snapshot();
    if handles.is_empty() {
        return;
    }

    log::info!("Tearing down {} running flow(s)", handles.len());
    let results = join_all(handles.iter().map(|handle| handle.kill())).await;
    for result in results {
        if let Err(e) = result {
            log::warn!("Teardown: {e}");
        }
    }
}

async fn watchdog<P: FlowProcess>(
    mut process: P,
    kill_rx: oneshot::Receiver<KillAck>,
    handle: Arc<RunHandle>,
    registry: Arc<RunRegistry>,
    cruncher: Option<Arc<dyn Cruncher>>,
    done_tx: mpsc::UnboundedSender<StatusReport>,
) {
    let outcome = match supervise(&mut process, kill_rx).await {
        Ok(Captured { stdout, .. }) => match &cruncher {
            Some(cruncher) => match cruncher.crunch(&stdout) {
                Ok(samples) => Ok(samples),
                Err(source) => Err(FlowError::Crunch {
                    source,
                    raw: stdout,
                }),
            },
            None => Ok(stdout),
        },
        Err(e) => Err(e.into()),
    };

    registry.remove(&handle);

    let report = StatusReport {
        label: handle.label().to_string(),
        role: handle.role(),
        outcome,
    };
    if done_tx.send(report).is_err() {
        log::debug!(
            "{} {} finished after its batch was stopped",
            handle.role(),
            handle.label()
        );
    }
}

/// Wait for `process` to exit, signalling it if a kill request arrives first.
async fn supervise<P: FlowProcess>(
    process: &mut P,
    kill_rx: oneshot::Receiver<KillAck>,
) -> Result<Captured, RunnerError> {
    tokio::select! {
        result = process.wait() => return result,
        request = kill_rx => {
            if let Ok(ack) = request {
                let _ = ack.send(process.start_kill());
            }
        }
    }

    process.wait().await
}
