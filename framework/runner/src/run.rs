use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use trafic_config::{load_flows, Settings};
use trafic_cruncher::Iperf3Cruncher;

use crate::cli::TraficCli;
use crate::error::ScheduleError;
use crate::init::init_logging;
use crate::process::Iperf3Launcher;
use crate::scheduler::{FlowOutput, Scheduler};
use crate::shutdown::start_shutdown_listener;
use crate::types::TraficResult;

/// Run every flow of the configured directory for the role selected on the command line.
pub fn run(cli: TraficCli) -> TraficResult<()> {
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings '{}'", cli.config.display()))?;
    let resolved = Resolved::new(&cli, settings);

    init_logging(resolved.log_tag.as_deref())?;
    log::info!("Using settings file: {}", cli.config.display());

    let flows_dir = resolved.flows_dir.context(
        "No flows directory configured. Pass --flows-dir or set 'flows.dir' in the settings file",
    )?;
    let flows = load_flows(&flows_dir)
        .with_context(|| format!("Failed to load flows from '{}'", flows_dir.display()))?;
    log::info!("Loaded {} flow(s) from {}", flows.len(), flows_dir.display());

    let launcher = Iperf3Launcher::from_env()?;
    log::debug!("Using iperf3 binary: {}", launcher.program().display());

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime);

    let mut scheduler = Scheduler::new(launcher, cli.command.role()).with_shutdown(shutdown_handle);
    if cli.crunch {
        scheduler = scheduler.with_cruncher(Iperf3Cruncher);
    }

    match runtime.block_on(scheduler.run(&flows)) {
        Ok(outputs) => write_outputs(cli.output_dir.as_deref(), &outputs),
        Err(e) => {
            save_raw_output(cli.output_dir.as_deref(), &e);
            Err(e.into())
        }
    }
}

/// Settings after flags and environment have been applied over the settings file.
#[derive(Debug, PartialEq)]
struct Resolved {
    log_tag: Option<String>,
    flows_dir: Option<PathBuf>,
}

impl Resolved {
    fn new(cli: &TraficCli, settings: Settings) -> Self {
        Self {
            log_tag: cli.log_tag.clone().or(settings.log.tag),
            flows_dir: cli.flows_dir.clone().or(settings.flows.dir),
        }
    }
}

fn write_outputs(output_dir: Option<&Path>, outputs: &[FlowOutput]) -> TraficResult<()> {
    let Some(dir) = output_dir else {
        let mut stdout = std::io::stdout().lock();
        for output in outputs {
            stdout.write_all(&output.output)?;
            writeln!(stdout)?;
        }
        return Ok(());
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;
    for output in outputs {
        let path = dir.join(format!("{}.json", output.label));
        std::fs::write(&path, &output.output)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        log::info!("Wrote output of {} to {}", output.label, path.display());
    }

    Ok(())
}

/// Keep the captured output of a flow whose report could not be crunched.
fn save_raw_output(output_dir: Option<&Path>, error: &ScheduleError) {
    let ScheduleError::FlowFailed { label, source, .. } = error else {
        return;
    };
    let Some(raw) = source.raw_output() else {
        return;
    };

    let Some(dir) = output_dir else {
        log::warn!(
            "Raw output of {label}: {}",
            String::from_utf8_lossy(raw).trim()
        );
        return;
    };

    let path = dir.join(format!("{label}.raw"));
    match std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, raw)) {
        Ok(()) => log::warn!("Raw output of {label} saved to {}", path.display()),
        Err(e) => log::error!("Failed to save raw output of {label}: {e}"),
    }
}
