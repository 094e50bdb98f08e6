//! Build errors for transitions, charts and interpreters.

use crate::core::DefinitionError;
use crate::interpreter::ChartError;
use thiserror::Error;

/// Errors that can occur when building definitions and interpreters.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition from '{0}' has neither a target, an action nor guards")]
    EmptyTransition(String),

    #[error("Transition from '{0}' mixes guards with a direct target or action")]
    ConflictingTargets(String),

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Chart definition not specified. Call .definition(chart) before .build()")]
    MissingDefinition,

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}
