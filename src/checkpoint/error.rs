//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur while taking or resuming a checkpoint.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckpointError {
    #[error("Could not encode checkpoint as JSON: {0}")]
    SerializationFailed(String),

    #[error("Could not read checkpoint JSON: {0}")]
    DeserializationFailed(String),

    /// Written by an incompatible format version
    #[error("Checkpoint format {found} cannot be resumed, this build reads format {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Cannot checkpoint an interpreter before initialize()")]
    NotInitialized,

    /// Names a state missing from the chart, or of the wrong kind
    #[error("Checkpoint does not fit this chart: {0}")]
    ChartMismatch(String),
}
