//! Errors raised by the interpreter.

use crate::core::DefinitionError;
use crate::patch::PatchError;
use thiserror::Error;

/// Errors that can occur while initializing or dispatching.
///
/// "No transition matches this event" is not an error: such a dispatch is a
/// well-defined no-op.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChartError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("Event '{0}' is reserved for state entry and cannot be dispatched")]
    InvalidEvent(String),

    #[error("Action '{action}' returned a malformed model update: {source}")]
    ContractViolation { action: String, source: PatchError },

    #[error("Model update of action '{action}' could not be applied: {source}")]
    PatchApplication { action: String, source: PatchError },

    #[error("Interpreter must be initialized before events are dispatched")]
    NotInitialized,
}
