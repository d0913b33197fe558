//! Flow descriptors for the trafic scheduler.
//!
//! A flow is one configured iperf3 client/server pairing. Flows are usually loaded from a
//! directory of YAML files with [load_flows], after which the scheduler picks the
//! role-specific payload with [FlowConfig::config_for] and turns it into an iperf3 argument
//! vector through [ToArgs].

mod args;
mod client;
mod common;
mod error;
mod flow;
mod load;
mod server;
mod settings;

pub use args::{ArgsError, ToArgs};
pub use client::ClientConfig;
pub use common::CommonConfig;
pub use error::ConfigError;
pub use flow::{FlowConfig, Role, RoleConfig};
pub use load::{load_flows, validate_flows};
pub use server::ServerConfig;
pub use settings::{FlowsSettings, LogSettings, Settings, DEFAULT_SETTINGS_PATH};
