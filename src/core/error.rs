//! Definition errors for state trees and transition tables.

use thiserror::Error;

/// Errors raised when a chart definition cannot be interpreted or exported.
///
/// These are construction-time bugs in the definition, never runtime
/// conditions the interpreter recovers from.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    #[error("State '{0}' is declared more than once")]
    DuplicateState(String),

    #[error("State name '{0}' is reserved")]
    ReservedStateName(String),

    #[error("Transition references unknown state '{0}'")]
    UnknownState(String),

    #[error("History target '{0}' does not name a compound state")]
    InvalidHistoryTarget(String),

    #[error("Compound state '{0}' has no entry transition")]
    MissingEntryTransition(String),

    #[error("No entry guard of compound state '{0}' was satisfied")]
    UnresolvedEntry(String),

    #[error("Entry transition of '{from}' must target a descendant, found '{to}'")]
    EntryOutsideState { from: String, to: String },

    #[error("Entry transition of '{0}' has no target state")]
    EntryWithoutTarget(String),

    #[error("Anonymous {kind} on transition from '{from}'; a name is required")]
    AnonymousFunction { from: String, kind: &'static str },

    #[error("No {kind} registered under the name '{name}'")]
    UnknownFunction { name: String, kind: &'static str },

    #[error("Automatic transitions loop back into state '{0}'")]
    AutomaticCycle(String),

    #[error("Malformed definition: {0}")]
    Malformed(String),

    #[error("State tree declares no states")]
    EmptyChart,

    #[error("Definition has {} problems: {}", .0.len(), join(.0))]
    Multiple(Vec<DefinitionError>),
}

impl DefinitionError {
    /// Collapse a list of problems into one error.
    pub(crate) fn from_many(mut errors: Vec<DefinitionError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            DefinitionError::Multiple(errors)
        }
    }
}

fn join(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
