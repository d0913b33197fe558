use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::args::{ArgsError, ToArgs};
use crate::client::ClientConfig;
use crate::error::ConfigError;
use crate::server::ServerConfig;

/// The side of a flow a scheduler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Runs the iperf3 client and starts the measurement.
    Initiator,
    /// Runs the iperf3 server and accepts the measurement.
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "client"),
            Role::Responder => write!(f, "server"),
        }
    }
}

/// One configured test.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlowConfig {
    /// Unique key of the flow within a scheduling run.
    pub label: String,
    /// Offsets from the shared epoch at which the flow should run. Only the first one is used,
    /// to order the flows.
    #[serde(deserialize_with = "deserialize_offsets")]
    pub when: Vec<Duration>,
    #[serde(default)]
    pub collector: Option<String>,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl FlowConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Read, parse and validate a flow file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let flow = Self::from_yaml(&yaml).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        flow.validate()?;

        Ok(flow)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        if self.when.is_empty() {
            return Err(ConfigError::EmptySchedule(self.label.clone()));
        }
        Ok(())
    }

    /// The offset the scheduler orders flows by. A flow without offsets sorts first.
    pub fn first_offset(&self) -> Duration {
        self.when.first().copied().unwrap_or_default()
    }

    pub fn config_for(&self, role: Role) -> RoleConfig<'_> {
        match role {
            Role::Initiator => RoleConfig::Client(&self.client),
            Role::Responder => RoleConfig::Server(&self.server),
        }
    }
}

/// The payload of a [FlowConfig] selected for one [Role].
#[derive(Debug, Clone, Copy)]
pub enum RoleConfig<'a> {
    Client(&'a ClientConfig),
    Server(&'a ServerConfig),
}

impl ToArgs for RoleConfig<'_> {
    fn to_args(&self) -> Result<Vec<String>, ArgsError> {
        match self {
            RoleConfig::Client(cfg) => cfg.to_args(),
            RoleConfig::Server(cfg) => cfg.to_args(),
        }
    }
}

fn deserialize_offsets<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let offsets = Vec::<humantime_serde::Serde<Duration>>::deserialize(deserializer)?;
    Ok(offsets.into_iter().map(|d| d.into_inner()).collect())
}
