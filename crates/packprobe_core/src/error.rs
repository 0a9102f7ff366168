use thiserror::Error;

/// Failure taxonomy for one resolution run. Everything except `EmptyBundle`
/// is recoverable at the task boundary: the orchestrator logs the offending
/// specifier and moves on.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A specifier produced a candidate that is not a valid URL or path.
    #[error("invalid location derived from '{specifier}': {reason}")]
    InvalidLocation { specifier: String, reason: String },

    /// Every candidate and every suffix fallback was exhausted.
    #[error("'{specifier}' not found after trying {tried} candidate locations")]
    FetchNotFound { specifier: String, tried: usize },

    /// The module source could not be parsed. The module is still bundled
    /// with its raw text; it just contributes no edges.
    #[error("failed to parse module at {location}")]
    ParseFailed { location: String },

    /// Minification failed; the caller measures the raw bundle instead.
    #[error("minification failed: {0}")]
    MinifyFailed(String),

    /// Not a single module could be fetched. The only fatal variant.
    #[error("no modules could be bundled for '{0}'")]
    EmptyBundle(String),
}
