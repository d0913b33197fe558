use serde::Deserialize;

use crate::args::{push_key, ArgsError, ToArgs};
use crate::common::CommonConfig;

/// iperf3 server (responder) configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    /// Handle a single client connection, then exit. Without it the server never completes on
    /// its own.
    pub one_off: bool,
}

impl ToArgs for ServerConfig {
    fn to_args(&self) -> Result<Vec<String>, ArgsError> {
        let mut args = vec!["--server".to_string()];
        self.common.push_args(&mut args);
        push_key(&mut args, "--one-off", self.one_off);
        Ok(args)
    }
}
