//! Runs one side of a traffic mix: every configured flow gets an iperf3 process, and the first
//! flow to fail stops the others.

mod cli;
mod error;
mod init;
mod iperf3_binary;
mod process;
mod registry;
mod run;
mod scheduler;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::cli::{RoleCommand, TraficCli};
    pub use crate::error::{FlowError, RunnerError, ScheduleError, TeardownError};
    pub use crate::init::{init, init_logging};
    pub use crate::iperf3_binary::{iperf3_path, IPERF3_BIN, TRAFIC_IPERF3_PATH_ENV};
    pub use crate::process::{Captured, FlowProcess, Iperf3Launcher, Iperf3Process, Launcher};
    pub use crate::registry::{RunHandle, RunRegistry};
    pub use crate::run::run;
    pub use crate::scheduler::{sort_flows_by_deadline, tear_down, FlowOutput, Scheduler};
    pub use crate::types::TraficResult;
    pub use trafic_config::{FlowConfig, Role};
    pub use trafic_core::prelude::ShutdownHandle;
}
