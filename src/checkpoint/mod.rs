//! Checkpoint and resume for interpreters.
//!
//! A [`Checkpoint`] captures the runtime side of an interpreter (control
//! state, model, history store, trace) so a long-lived chart can survive a
//! process restart. Predicates and actions are not serializable, so resuming
//! needs the same definition rebuilt by the caller. Where the bytes are kept
//! is up to the caller.

use crate::core::{HistoryStore, TransitionLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of an interpreter's runtime state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Active leaf
    pub control_state: String,

    /// Extended state
    pub model: Value,

    /// Last active leaf per exited compound state
    pub history: HistoryStore,

    /// Trace of control-state changes
    pub log: TransitionLog,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}
