use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Location of the settings file when none is given on the command line.
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/trafic.yaml";

/// Scheduler settings read from the settings file. Command line flags and `TRAFIC_*`
/// environment variables take precedence over these values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log: LogSettings,
    pub flows: FlowsSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Prepended to every log line.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowsSettings {
    /// Directory holding one YAML file per flow.
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Load the settings file. A missing file is not an error and yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = match std::fs::read_to_string(path) {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings file at '{}', using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        log::debug!("Using settings file: {}", path.display());
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&yaml).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let settings = Settings::load("/non/existent/trafic.yaml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = NamedTempFile::new().expect("failed to create temp file");
        assert_eq!(Settings::load(file.path()).unwrap(), Settings::default());
    }

    #[test]
    fn load_settings() {
        let file = NamedTempFile::new().expect("failed to create temp file");
        std::fs::write(file.path(), "log:\n  tag: lab-a\nflows:\n  dir: /srv/flows\n").unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.log.tag.as_deref(), Some("lab-a"));
        assert_eq!(settings.flows.dir, Some(PathBuf::from("/srv/flows")));
    }
}
