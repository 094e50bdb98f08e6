//! Runtime side of a chart: control-state resolution, event bubbling,
//! guard evaluation, entry descent and deep history.
//!
//! # Dispatch in brief
//!
//! 1. Bubble the event from the active leaf up through its ancestors until a
//!    state declares a transition for it.
//! 2. For guarded transitions, take the first clause whose predicate holds.
//! 3. Record the old leaf as history of every compound state being exited.
//! 4. Run the action and apply its patch to the model.
//! 5. Resolve the target (history or literal) and descend to a leaf, firing
//!    entry and automatic transitions along the way.
//!
//! Unmatched events are no-ops, not errors.

mod descent;
mod error;
mod machine;

pub use error::ChartError;
pub use machine::{Interpreter, StepOutcome};
