use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context};

use crate::types::TraficResult;

/// Name of the measurement tool, looked up on the `PATH`.
pub const IPERF3_BIN: &str = "iperf3";

/// Environment variable to override the iperf3 binary used to run flows.
pub const TRAFIC_IPERF3_PATH_ENV: &str = "TRAFIC_IPERF3_PATH";

/// Resolve the iperf3 binary.
///
/// [`TRAFIC_IPERF3_PATH_ENV`] may hold a path, which must exist, or a bare program name, which is
/// looked up on the `PATH`. Without it `iperf3` is looked up on the `PATH`.
pub fn iperf3_path() -> TraficResult<PathBuf> {
    let Some(configured) = env::var_os(TRAFIC_IPERF3_PATH_ENV) else {
        return find_on_path(Path::new(IPERF3_BIN));
    };
    if configured.is_empty() {
        bail!("'{TRAFIC_IPERF3_PATH_ENV}' set to empty string");
    }

    let configured = PathBuf::from(configured);
    if is_bare_name(&configured) {
        return find_on_path(&configured);
    }

    ensure!(
        configured.exists(),
        "'{TRAFIC_IPERF3_PATH_ENV}' points to '{}' but that path doesn't exist",
        configured.display()
    );
    Ok(configured)
}

fn is_bare_name(path: &Path) -> bool {
    path.components().count() == 1 && path.file_name().is_some()
}

fn find_on_path(name: &Path) -> TraficResult<PathBuf> {
    log::debug!("Looking for '{}' in user's 'PATH'", name.display());
    which::which(name).with_context(|| {
        format!(
            "'{}' not found in PATH. Please install iperf3 or set '{TRAFIC_IPERF3_PATH_ENV}' to the correct path.",
            name.display()
        )
    })
}
