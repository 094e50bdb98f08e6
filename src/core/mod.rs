//! Definition types of a statechart.
//!
//! This module holds the passive data the interpreter and the exporters
//! consume:
//! - the [`StateTree`] and its flat [`StateIndex`]
//! - declared [`Transition`]s with their named [`Predicate`]s and [`Action`]s
//! - the [`ChartDefinition`] bundling both, with accumulating validation
//! - the [`HistoryStore`] and [`TransitionLog`] records kept at runtime

mod definition;
mod error;
mod history;
mod index;
mod registry;
mod transition;
mod tree;

pub use definition::ChartDefinition;
pub use error::DefinitionError;
pub use history::{HistoryStore, TransitionLog, TransitionRecord};
pub use index::{Ancestors, StateId, StateIndex};
pub use registry::{Action, ActionResult, Predicate, Registry};
pub use transition::{Alternative, GuardClause, Transition, TransitionTarget};
pub use tree::{
    history_of, history_owner, is_history_target, StateNode, StateTree, HISTORY_PREFIX,
    HISTORY_STATE_NAME, INITIAL_STATE_NAME, INIT_EVENT,
};
