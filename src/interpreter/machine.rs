//! The statechart interpreter.

use super::descent::Run;
use super::error::ChartError;
use crate::checkpoint::{Checkpoint, CheckpointError, CHECKPOINT_VERSION};
use crate::core::{
    ChartDefinition, HistoryStore, StateId, StateIndex, TransitionLog, INIT_EVENT,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What `initialize` and `dispatch` hand back.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// The model after every action of the step was applied
    pub model: Value,
    /// The active leaf
    pub control_state: String,
    /// Outputs of every action run, in order
    pub outputs: Vec<Value>,
}

/// Drives a model through a chart definition, one event at a time.
///
/// The interpreter is synchronous and single threaded: each call runs to
/// completion, entry descent included. Callers serialize events onto one
/// instance themselves.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{ChartDefinition, Registry};
/// use statecraft::interpreter::Interpreter;
/// use serde_json::{json, Value};
///
/// let definition = ChartDefinition::from_json(
///     &json!({
///         "states": { "A": { "B": "", "C": "" } },
///         "transitions": [
///             { "from": "nok", "event": "init", "to": "A" },
///             { "from": "A", "event": "init", "to": "B" },
///             { "from": "B", "event": "GO", "to": "C" }
///         ]
///     }),
///     &Registry::new(),
/// )
/// .unwrap();
///
/// let mut interpreter = Interpreter::new(definition, json!({}), Value::Null).unwrap();
/// assert_eq!(interpreter.initialize().unwrap().control_state, "B");
/// assert_eq!(interpreter.dispatch("GO", None).unwrap().control_state, "C");
/// ```
pub struct Interpreter {
    pub(super) definition: ChartDefinition,
    pub(super) index: StateIndex,
    /// state -> event -> position in the transition table
    pub(super) routes: HashMap<StateId, HashMap<String, usize>>,
    pub(super) settings: Value,
    initial_model: Value,
    model: Value,
    control_state: Option<StateId>,
    history: HistoryStore,
    log: TransitionLog,
    log_capacity: Option<usize>,
}

impl Interpreter {
    /// Validate `definition` and prepare an uninitialized interpreter.
    pub fn new(
        definition: ChartDefinition,
        initial_model: Value,
        settings: Value,
    ) -> Result<Self, ChartError> {
        let index = definition.validate()?;

        let mut routes: HashMap<StateId, HashMap<String, usize>> = HashMap::new();
        for (position, transition) in definition.transitions.iter().enumerate() {
            let Some(state) = index.id(&transition.from) else {
                continue;
            };
            let events = routes.entry(state).or_default();
            if events.contains_key(transition.trigger()) {
                warn!(
                    from = %transition.from,
                    event = transition.trigger(),
                    "duplicate transition ignored, the first declared one wins"
                );
                continue;
            }
            events.insert(transition.trigger().to_string(), position);
        }

        Ok(Self {
            definition,
            index,
            routes,
            settings,
            model: initial_model.clone(),
            initial_model,
            control_state: None,
            history: HistoryStore::new(),
            log: TransitionLog::new(),
            log_capacity: None,
        })
    }

    /// Bound the transition trace to the most recent `capacity` records.
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = Some(capacity);
        self.log = self.fresh_log();
        self
    }

    fn fresh_log(&self) -> TransitionLog {
        match self.log_capacity {
            Some(capacity) => TransitionLog::with_capacity(capacity),
            None => TransitionLog::new(),
        }
    }

    /// Descend from the root to the initial leaf.
    ///
    /// Calling it again restarts from the initial model with empty history.
    pub fn initialize(&mut self) -> Result<StepOutcome, ChartError> {
        let mut run = Run {
            model: self.initial_model.clone(),
            history: HistoryStore::new(),
            log: self.fresh_log(),
            outputs: Vec::new(),
        };
        let payload = Value::Null;

        let leaf = self.descend(&mut run, StateId::ROOT, &payload)?;
        let leaf = self.stabilize(&mut run, leaf, &payload)?;

        info!(state = self.index.name(leaf), "interpreter initialized");
        Ok(self.commit(run, leaf))
    }

    /// Process one event.
    ///
    /// Unmatched events, at the active leaf or any ancestor, leave the model
    /// and control state untouched and return no outputs.
    pub fn dispatch(
        &mut self,
        event: &str,
        payload: Option<Value>,
    ) -> Result<StepOutcome, ChartError> {
        if event == INIT_EVENT {
            return Err(ChartError::InvalidEvent(event.to_string()));
        }
        let leaf = self.control_state.ok_or(ChartError::NotInitialized)?;
        let payload = payload.unwrap_or(Value::Null);
        debug!(event, state = self.index.name(leaf), "dispatching event");

        let Some(transition) = self.find_transition(leaf, event) else {
            debug!(event, "no transition handles event");
            return Ok(self.unchanged());
        };
        let Some(choice) = self.select(transition, &self.model, &payload) else {
            debug!(event, from = %transition.from, "no guard satisfied");
            return Ok(self.unchanged());
        };

        let mut run = Run {
            model: self.model.clone(),
            history: self.history.clone(),
            log: self.log.clone(),
            outputs: Vec::new(),
        };
        let next = self.take(&mut run, leaf, choice, event, &payload)?;
        let next = self.stabilize(&mut run, next, &payload)?;
        Ok(self.commit(run, next))
    }

    fn commit(&mut self, run: Run, leaf: StateId) -> StepOutcome {
        self.model = run.model;
        self.history = run.history;
        self.log = run.log;
        self.control_state = Some(leaf);
        StepOutcome {
            model: self.model.clone(),
            control_state: self.index.name(leaf).to_string(),
            outputs: run.outputs,
        }
    }

    fn unchanged(&self) -> StepOutcome {
        StepOutcome {
            model: self.model.clone(),
            control_state: self.control_state().unwrap_or_default().to_string(),
            outputs: Vec::new(),
        }
    }

    /// Active leaf, `None` before `initialize`.
    pub fn control_state(&self) -> Option<&str> {
        self.control_state.map(|id| self.index.name(id))
    }

    pub fn is_initialized(&self) -> bool {
        self.control_state.is_some()
    }

    pub fn model(&self) -> &Value {
        &self.model
    }

    pub fn settings(&self) -> &Value {
        &self.settings
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn log(&self) -> &TransitionLog {
        &self.log
    }

    pub fn definition(&self) -> &ChartDefinition {
        &self.definition
    }

    pub fn index(&self) -> &StateIndex {
        &self.index
    }

    /// Snapshot the runtime state. Fails before `initialize`.
    pub fn checkpoint(&self) -> Result<Checkpoint, CheckpointError> {
        let control_state = self.control_state().ok_or(CheckpointError::NotInitialized)?;
        Ok(Checkpoint {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            control_state: control_state.to_string(),
            model: self.model.clone(),
            history: self.history.clone(),
            log: self.log.clone(),
        })
    }

    /// Continue from a checkpoint taken against the same definition.
    ///
    /// Nothing changes unless the whole checkpoint is accepted.
    pub fn resume(&mut self, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let leaf = self
            .index
            .id(&checkpoint.control_state)
            .filter(|id| self.index.is_leaf(*id))
            .ok_or_else(|| {
                CheckpointError::ChartMismatch(format!(
                    "'{}' is not a leaf state of this chart",
                    checkpoint.control_state
                ))
            })?;
        for (compound, recorded) in checkpoint.history.iter() {
            let compound_ok = self
                .index
                .id(compound)
                .is_some_and(|id| self.index.is_compound(id));
            let leaf_ok = self.index.id(recorded).is_some_and(|id| self.index.is_leaf(id));
            if !compound_ok || !leaf_ok {
                return Err(CheckpointError::ChartMismatch(format!(
                    "history entry '{compound}' -> '{recorded}' does not fit this chart"
                )));
            }
        }

        info!(
            id = %checkpoint.id,
            state = %checkpoint.control_state,
            "resuming from checkpoint"
        );
        self.model = checkpoint.model;
        self.history = checkpoint.history;
        self.log = checkpoint.log;
        self.control_state = Some(leaf);
        Ok(())
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("control_state", &self.control_state())
            .field("model", &self.model)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
