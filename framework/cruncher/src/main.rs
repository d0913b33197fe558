use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

/// Normalise an iperf3 JSON report into flat flow samples.
#[derive(Parser)]
#[command(about, long_about = None)]
struct CliArgs {
    /// Path to the iperf3 report produced with `--json`.
    report: PathBuf,

    /// Pretty-print the normalised samples.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::try_init()?;

    let args = CliArgs::parse();

    log::debug!("Reading report: {}", args.report.display());
    let raw = std::fs::read(&args.report)
        .with_context(|| format!("Failed to read report '{}'", args.report.display()))?;

    let samples = trafic_cruncher::crunch_samples(&raw)
        .with_context(|| format!("Failed to crunch report '{}'", args.report.display()))?;
    log::debug!("Normalised {} sample(s)", samples.len());

    let out = if args.pretty {
        serde_json::to_vec_pretty(&samples)
    } else {
        serde_json::to_vec(&samples)
    }
    .context("Failed to encode samples")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&out)?;
    writeln!(stdout)?;

    Ok(())
}
