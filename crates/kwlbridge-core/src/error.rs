use thiserror::Error;

/// Error type for the `kwlbridge-core` crate.
///
/// Almost nothing in the bridge is fatal -- poll and write failures are
/// logged and the loop keeps running. These variants cover the places
/// where an operation has a caller that can act on the failure.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid or incomplete bridge configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Device API error surfaced to a caller.
    #[error(transparent)]
    Api(#[from] kwlbridge_api::Error),

    /// A state write addressed a path with no entry.
    #[error("no state entry at path {path:?}")]
    UnknownPath { path: String },
}
