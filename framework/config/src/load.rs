use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::flow::FlowConfig;

/// Load every flow file found in `dir`.
///
/// Hidden entries and sub-directories are skipped. Files are read in name order so the
/// returned flows, and therefore the tie-breaking order of the scheduler, do not depend on the
/// directory listing order of the filesystem. A label used by two files is an error.
pub fn load_flows(dir: impl AsRef<Path>) -> Result<Vec<FlowConfig>, ConfigError> {
    let dir = dir.as_ref();
    let io_err = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if !entry.file_type().map_err(io_err)?.is_file() {
            log::debug!("Skipping non-file entry '{}'", entry.path().display());
            continue;
        }
        paths.push(entry.path());
    }
    paths.sort();

    let mut flows = Vec::with_capacity(paths.len());
    for path in paths {
        log::trace!("Loading flow from '{}'", path.display());
        flows.push(FlowConfig::from_file(&path)?);
    }
    validate_flows(&flows)?;

    log::debug!("Loaded {} flow(s) from '{}'", flows.len(), dir.display());

    Ok(flows)
}

/// Check every flow and that no label is used twice.
pub fn validate_flows(flows: &[FlowConfig]) -> Result<(), ConfigError> {
    let mut labels = HashSet::with_capacity(flows.len());
    for flow in flows {
        flow.validate()?;
        if !labels.insert(flow.label.as_str()) {
            return Err(ConfigError::DuplicateLabel(flow.label.clone()));
        }
    }
    Ok(())
}
