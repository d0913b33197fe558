use serde::Deserialize;

use crate::args::{push_key, push_key_val, ArgsError, ToArgs};

/// Configuration keys that are common to iperf3 clients and servers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CommonConfig {
    /// Bind to the interface associated with this address.
    pub bind: Option<String>,
    pub debug: bool,
    /// Transmit from, or receive into, this file.
    pub file: Option<String>,
    pub forceflush: bool,
    /// Emit the iperf3 report as JSON. Required when the output is crunched.
    pub json: bool,
    pub logfile: Option<String>,
    /// Unit used in the human readable report (`k`, `m`, `g`, `t`).
    pub format: Option<String>,
    #[serde(rename = "report-interval-s")]
    pub report_interval: Option<f32>,
    pub server_port: Option<u16>,
    pub verbose: bool,
}

impl CommonConfig {
    /// Append the common options to an argument vector that already holds the role options.
    pub fn push_args(&self, args: &mut Vec<String>) {
        push_key_val(args, "--bind", self.bind.as_deref());
        push_key(args, "--debug", self.debug);
        push_key_val(args, "--file", self.file.as_deref());
        push_key(args, "--forceflush", self.forceflush);
        push_key(args, "--json", self.json);
        push_key_val(args, "--logfile", self.logfile.as_deref());
        push_key_val(args, "--format", self.format.as_deref());
        push_key_val(args, "--interval", self.report_interval);
        push_key_val(args, "--port", self.server_port);
        push_key(args, "--verbose", self.verbose);
    }
}

impl ToArgs for CommonConfig {
    fn to_args(&self) -> Result<Vec<String>, ArgsError> {
        let mut args = Vec::new();
        self.push_args(&mut args);
        Ok(args)
    }
}
