//! Statecraft: a hierarchical statechart interpreter
//!
//! A chart is passive data: a tree of named states plus a table of
//! transitions whose guards and actions are named functions. The
//! [`Interpreter`] walks that data one event at a time, and the exporters
//! project the same data into diagrams.
//!
//! # Core Concepts
//!
//! - **State tree**: compound states group leaves; only leaves are ever active
//! - **Bubbling**: unhandled events travel up to the enclosing states
//! - **Guards**: ordered predicates, the first one that holds wins
//! - **Deep history**: re-entering a state through `history.<name>` resumes
//!   the exact leaf it was left in
//! - **Model updates**: actions return JSON patch operations instead of
//!   mutating the model
//!
//! # Example
//!
//! ```rust
//! use statecraft::builder::{entry, simple_transition, ChartBuilder, InterpreterBuilder};
//! use statecraft::core::{history_of, StateTree, INITIAL_STATE_NAME};
//! use serde_json::json;
//!
//! let chart = ChartBuilder::new()
//!     .states(StateTree::from_json(&json!({
//!         "playing_group": { "playing": "", "paused": "" },
//!         "stopped": ""
//!     })).unwrap())
//!     .add_transition(entry(INITIAL_STATE_NAME, "playing_group"))
//!     .add_transition(entry("playing_group", "playing"))
//!     .add_transition(simple_transition("playing", "PAUSE", "paused"))
//!     .add_transition(simple_transition("playing_group", "STOP", "stopped"))
//!     .add_transition(simple_transition("stopped", "PLAY", history_of("playing_group")))
//!     .build()
//!     .unwrap();
//!
//! let mut player = InterpreterBuilder::new().definition(chart).build().unwrap();
//! player.initialize().unwrap();
//! player.dispatch("PAUSE", None).unwrap();
//! player.dispatch("STOP", None).unwrap();
//!
//! let outcome = player.dispatch("PLAY", None).unwrap();
//! assert_eq!(outcome.control_state, "paused");
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod export;
pub mod interpreter;
pub mod patch;

// Re-export commonly used types
pub use crate::builder::{ChartBuilder, InterpreterBuilder, TransitionBuilder};
pub use crate::core::{
    Action, ActionResult, ChartDefinition, Predicate, Registry, StateTree, Transition,
};
pub use crate::export::{to_plantuml, to_visualizer_format, ExportOptions};
pub use crate::interpreter::{ChartError, Interpreter, StepOutcome};
pub use crate::patch::{apply_patch, PatchOperation};
