/// Recommended error type for binaries and glue code built on the runner. Library operations
/// return the typed errors from [crate::prelude] so callers can match on them.
pub type TraficResult<T> = anyhow::Result<T>;
