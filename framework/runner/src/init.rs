use std::io::Write as _;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;

use crate::cli::TraficCli;
use crate::types::TraficResult;

/// Parse the command line of the scheduler.
pub fn init() -> TraficCli {
    TraficCli::parse()
}

/// Initialise logging. The level is taken from `RUST_LOG` and defaults to `info`. When a `tag`
/// is given it prefixes every line, so the output of several schedulers can be told apart.
pub fn init_logging(tag: Option<&str>) -> TraficResult<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(tag) = tag {
        let tag = tag.to_string();
        builder.format(move |buf, record| {
            writeln!(
                buf,
                "{tag} [{} {} {}] {}",
                buf.timestamp(),
                record.level(),
                record.target(),
                record.args()
            )
        });
    }

    builder.try_init().context("Failed to initialise logging")
}
