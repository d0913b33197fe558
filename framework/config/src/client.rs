use serde::Deserialize;

use crate::args::{push_key, push_key_val, ArgsError, ToArgs};
use crate::common::CommonConfig;

/// iperf3 client (initiator) configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    /// Host running the iperf3 server.
    pub server_address: String,
    /// Prefix for every output line, and the `title` of the JSON report.
    pub title: Option<String>,
    pub udp: bool,
    /// Target bitrate, in iperf3 notation (`10M`, `1G`).
    pub bitrate: Option<String>,
    #[serde(rename = "time-s")]
    pub time: Option<u32>,
    pub bytes: Option<String>,
    pub parallel: Option<u16>,
    pub reverse: bool,
    pub window: Option<String>,
    pub length: Option<String>,
    pub no_delay: bool,
    pub tos: Option<u8>,
    /// Ask the server to send back its own report, which is what the datagram report shape is
    /// built from.
    pub get_server_output: bool,
}

impl ToArgs for ClientConfig {
    fn to_args(&self) -> Result<Vec<String>, ArgsError> {
        if self.server_address.trim().is_empty() {
            return Err(ArgsError::MissingServerAddress);
        }

        let mut args = vec!["--client".to_string(), self.server_address.clone()];
        self.common.push_args(&mut args);

        push_key_val(&mut args, "--title", self.title.as_deref());
        push_key(&mut args, "--udp", self.udp);
        push_key_val(&mut args, "--bitrate", self.bitrate.as_deref());
        push_key_val(&mut args, "--time", self.time);
        push_key_val(&mut args, "--bytes", self.bytes.as_deref());
        push_key_val(&mut args, "--parallel", self.parallel);
        push_key(&mut args, "--reverse", self.reverse);
        push_key_val(&mut args, "--window", self.window.as_deref());
        push_key_val(&mut args, "--length", self.length.as_deref());
        push_key(&mut args, "--no-delay", self.no_delay);
        push_key_val(&mut args, "--tos", self.tos);
        push_key(&mut args, "--get-server-output", self.get_server_output);

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn server_address_is_required() {
        assert_eq!(
            ClientConfig::default().to_args(),
            Err(ArgsError::MissingServerAddress)
        );
    }

    #[test]
    fn udp_client_args() {
        let cfg: ClientConfig = serde_yaml::from_str(
            r#"
server-address: 192.168.1.10
server-port: 5400
json: true
title: voip
udp: true
bitrate: 64K
time-s: 30
get-server-output: true
"#,
        )
        .unwrap();

        assert_eq!(
            cfg.to_args().unwrap(),
            [
                "--client",
                "192.168.1.10",
                "--json",
                "--port",
                "5400",
                "--title",
                "voip",
                "--udp",
                "--bitrate",
                "64K",
                "--time",
                "30",
                "--get-server-output",
            ]
        );
    }
}
