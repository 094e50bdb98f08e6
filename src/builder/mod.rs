//! Builder API for ergonomic chart and interpreter construction.
//!
//! This module provides fluent builders and helper constructors for the
//! most common transition shapes.

pub mod chart;
pub mod error;
pub mod machine;
pub mod transition;

pub use chart::ChartBuilder;
pub use error::BuildError;
pub use machine::InterpreterBuilder;
pub use transition::TransitionBuilder;

use crate::core::{GuardClause, Transition, TransitionTarget, INIT_EVENT};

/// Entry transition selecting the initial child of `from`.
///
/// # Example
///
/// ```
/// use statecraft::builder::entry;
/// use statecraft::core::INITIAL_STATE_NAME;
///
/// let transition = entry(INITIAL_STATE_NAME, "no_cd_loaded");
/// assert!(transition.is_automatic());
/// ```
pub fn entry(from: impl Into<String>, to: impl Into<String>) -> Transition {
    Transition {
        from: from.into(),
        event: Some(INIT_EVENT.to_string()),
        target: TransitionTarget::Unconditional {
            to: Some(to.into()),
            action: None,
        },
    }
}

/// Unconditional transition without action.
///
/// # Example
///
/// ```
/// use statecraft::builder::simple_transition;
///
/// let transition = simple_transition("cd_drawer_closed", "EJECT", "cd_drawer_open");
/// assert_eq!(transition.trigger(), "EJECT");
/// ```
pub fn simple_transition(
    from: impl Into<String>,
    event: impl Into<String>,
    to: impl Into<String>,
) -> Transition {
    Transition {
        from: from.into(),
        event: Some(event.into()),
        target: TransitionTarget::Unconditional {
            to: Some(to.into()),
            action: None,
        },
    }
}

/// Guarded transition; clauses are tried in order.
pub fn guarded_transition(
    from: impl Into<String>,
    event: impl Into<String>,
    clauses: Vec<GuardClause>,
) -> Transition {
    Transition {
        from: from.into(),
        event: Some(event.into()),
        target: TransitionTarget::Guarded(clauses),
    }
}
