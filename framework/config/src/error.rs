use std::path::PathBuf;

/// An error type for loading flow and settings files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("flow has an empty label")]
    EmptyLabel,
    #[error("flow '{0}' has no scheduled offsets")]
    EmptySchedule(String),
    #[error("flow label '{0}' is used more than once")]
    DuplicateLabel(String),
}
