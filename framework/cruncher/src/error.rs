/// An error type for [`crate::crunch`].
#[derive(Debug, thiserror::Error)]
pub enum CrunchError {
    /// The report is neither a TCP report nor a report with a nested server output.
    /// Holds the last decoding error.
    #[error("unrecognized report schema: {0}")]
    UnrecognizedReportSchema(#[source] serde_json::Error),
    #[error("cannot encode samples: {0}")]
    Encoding(#[source] serde_json::Error),
}
