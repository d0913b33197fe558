use std::path::PathBuf;

use clap::{Parser, Subcommand};
use trafic_config::{Role, DEFAULT_SETTINGS_PATH};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
pub struct TraficCli {
    /// The settings file. A missing file is treated as empty.
    #[arg(long, global = true, env = "TRAFIC_CONFIG", default_value = DEFAULT_SETTINGS_PATH)]
    pub config: PathBuf,

    /// Tag prepended to every log line. Overrides `log.tag` from the settings file.
    #[arg(long, global = true, env = "TRAFIC_LOG_TAG")]
    pub log_tag: Option<String>,

    /// Directory holding one YAML file per flow. Overrides `flows.dir` from the settings file.
    #[arg(long, global = true, env = "TRAFIC_FLOWS_DIR")]
    pub flows_dir: Option<PathBuf>,

    /// Write the output of each flow to `<output-dir>/<label>.json` instead of standard output.
    #[arg(long, global = true, env = "TRAFIC_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Normalise the iperf3 JSON report of each flow into flat samples.
    ///
    /// The flows must be configured with `json: true` for their reports to be understood.
    #[arg(long, global = true, env = "TRAFIC_CRUNCH")]
    pub crunch: bool,

    #[command(subcommand)]
    pub command: RoleCommand,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCommand {
    /// Run the iperf3 client of every flow. Completes once every client has finished.
    Clients,
    /// Run the iperf3 server of every flow. Runs until stopped with Ctrl-C.
    Servers,
}

impl RoleCommand {
    pub fn role(self) -> Role {
        match self {
            RoleCommand::Clients => Role::Initiator,
            RoleCommand::Servers => Role::Responder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = TraficCli::try_parse_from(["schedule", "servers"]).unwrap();

        assert_eq!(cli.command.role(), Role::Responder);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert!(cli.flows_dir.is_none());
        assert!(!cli.crunch);
    }

    #[test]
    fn flags_may_follow_the_subcommand() {
        let cli = TraficCli::try_parse_from([
            "schedule",
            "--config",
            "/tmp/trafic.yaml",
            "clients",
            "--flows-dir",
            "/tmp/flows",
            "--crunch",
        ])
        .unwrap();

        assert_eq!(cli.command.role(), Role::Initiator);
        assert_eq!(cli.config, PathBuf::from("/tmp/trafic.yaml"));
        assert_eq!(cli.flows_dir, Some(PathBuf::from("/tmp/flows")));
        assert!(cli.crunch);
    }

    #[test]
    fn role_is_required() {
        assert!(TraficCli::try_parse_from(["schedule"]).is_err());
    }
}
