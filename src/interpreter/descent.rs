//! Transition firing, entry descent and history resolution.
//!
//! Everything here works on a [`Run`]: working copies of the model, the
//! history store and the trace. The interpreter commits a run only once the
//! whole dispatch has succeeded.

use super::error::ChartError;
use super::machine::Interpreter;
use crate::core::{
    history_owner, Action, DefinitionError, HistoryStore, StateId, Transition, TransitionLog,
    TransitionRecord, TransitionTarget, INIT_EVENT,
};
use crate::patch;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, trace};

/// Working state of one initialize or dispatch call.
pub(super) struct Run {
    pub model: Value,
    pub history: HistoryStore,
    pub log: TransitionLog,
    pub outputs: Vec<Value>,
}

/// The alternative selected for a transition.
#[derive(Clone, Copy)]
pub(super) struct Choice<'a> {
    pub to: Option<&'a str>,
    pub action: Option<&'a Action>,
}

impl Interpreter {
    /// Transition declared on `state` itself for `event`.
    pub(super) fn route(&self, state: StateId, event: &str) -> Option<&Transition> {
        let position = *self.routes.get(&state)?.get(event)?;
        self.definition.transitions.get(position)
    }

    /// Bubble `event` from `leaf` up through its ancestors.
    pub(super) fn find_transition(&self, leaf: StateId, event: &str) -> Option<&Transition> {
        self.index
            .ancestors(leaf)
            .find_map(|state| self.route(state, event))
    }

    /// Pick the alternative to take: the transition itself, or the first
    /// guard clause whose predicate holds.
    pub(super) fn select<'a>(
        &self,
        transition: &'a Transition,
        model: &Value,
        payload: &Value,
    ) -> Option<Choice<'a>> {
        match &transition.target {
            TransitionTarget::Unconditional { to, action } => Some(Choice {
                to: to.as_deref(),
                action: action.as_ref(),
            }),
            TransitionTarget::Guarded(clauses) => clauses
                .iter()
                .find(|clause| {
                    let holds = clause.predicate.check(model, payload, &self.settings);
                    trace!(
                        from = %transition.from,
                        predicate = clause.predicate.name(),
                        holds,
                        "evaluated guard"
                    );
                    holds
                })
                .map(|clause| Choice {
                    to: clause.to.as_deref(),
                    action: clause.action.as_ref(),
                }),
        }
    }

    /// Fire `choice` from `leaf`, returning the leaf reached.
    ///
    /// Records history for every compound state being exited, runs the
    /// action, then resolves the target down to a leaf.
    pub(super) fn take(
        &self,
        run: &mut Run,
        leaf: StateId,
        choice: Choice<'_>,
        event: &str,
        payload: &Value,
    ) -> Result<StateId, ChartError> {
        let Some(to) = choice.to else {
            self.run_action(run, choice.action, payload)?;
            return Ok(leaf);
        };

        let (target, via_history) = self.resolve_name(to)?;
        self.record_exits(run, leaf, target);
        self.run_action(run, choice.action, payload)?;

        let next = if via_history {
            self.restore(run, target, payload)?
        } else {
            self.descend(run, target, payload)?
        };

        debug!(
            from = self.index.name(leaf),
            to = self.index.name(next),
            event,
            "transition taken"
        );
        run.log = std::mem::take(&mut run.log).record(TransitionRecord {
            from: self.index.name(leaf).to_string(),
            to: self.index.name(next).to_string(),
            event: event.to_string(),
            timestamp: Utc::now(),
        });
        Ok(next)
    }

    /// Follow entry transitions from `state` until a leaf is reached.
    pub(super) fn descend(
        &self,
        run: &mut Run,
        state: StateId,
        payload: &Value,
    ) -> Result<StateId, ChartError> {
        let mut current = state;
        while self.index.is_compound(current) {
            let name = self.index.name(current);
            let transition = self
                .route(current, INIT_EVENT)
                .ok_or_else(|| DefinitionError::MissingEntryTransition(name.to_string()))?;
            let choice = self
                .select(transition, &run.model, payload)
                .ok_or_else(|| DefinitionError::UnresolvedEntry(name.to_string()))?;
            let to = choice
                .to
                .ok_or_else(|| DefinitionError::EntryWithoutTarget(name.to_string()))?;

            let (target, via_history) = self.resolve_name(to)?;
            if !self.index.contains(current, target) {
                return Err(DefinitionError::EntryOutsideState {
                    from: name.to_string(),
                    to: to.to_string(),
                }
                .into());
            }

            self.run_action(run, choice.action, payload)?;
            trace!(state = name, target = to, "entered compound state");

            current = match run.history.get(self.index.name(target)) {
                Some(leaf) if via_history => self.state_id(leaf)?,
                _ => target,
            };
        }
        Ok(current)
    }

    /// Fire automatic transitions from `leaf` until none applies.
    pub(super) fn stabilize(
        &self,
        run: &mut Run,
        leaf: StateId,
        payload: &Value,
    ) -> Result<StateId, ChartError> {
        let mut current = leaf;
        let mut arrived: Vec<StateId> = Vec::new();
        loop {
            let Some(transition) = self.route(current, INIT_EVENT) else {
                return Ok(current);
            };
            let Some(choice) = self.select(transition, &run.model, payload) else {
                return Ok(current);
            };
            // Internal transitions do not re-enter the leaf.
            if choice.to.is_none() {
                self.run_action(run, choice.action, payload)?;
                return Ok(current);
            }
            if arrived.contains(&current) {
                return Err(
                    DefinitionError::AutomaticCycle(self.index.name(current).to_string()).into(),
                );
            }
            arrived.push(current);
            current = self.take(run, current, choice, INIT_EVENT, payload)?;
        }
    }

    /// Resume at the leaf last active under `compound`, or enter it afresh.
    fn restore(
        &self,
        run: &mut Run,
        compound: StateId,
        payload: &Value,
    ) -> Result<StateId, ChartError> {
        match run.history.get(self.index.name(compound)) {
            Some(leaf) => {
                debug!(state = self.index.name(compound), leaf, "restoring history");
                Ok(self.state_id(leaf)?)
            }
            None => self.descend(run, compound, payload),
        }
    }

    /// Remember `leaf` under every compound ancestor that does not contain
    /// `target`.
    fn record_exits(&self, run: &mut Run, leaf: StateId, target: StateId) {
        let leaf_name = self.index.name(leaf);
        for ancestor in self.index.ancestors(leaf).skip(1) {
            if ancestor == StateId::ROOT || self.index.contains(ancestor, target) {
                break;
            }
            trace!(state = self.index.name(ancestor), leaf = leaf_name, "recording history");
            run.history.record(self.index.name(ancestor), leaf_name);
        }
    }

    fn run_action(
        &self,
        run: &mut Run,
        action: Option<&Action>,
        payload: &Value,
    ) -> Result<(), ChartError> {
        let Some(action) = action else {
            return Ok(());
        };

        let result = action.run(&run.model, payload, &self.settings);
        patch::validate(&result.model_update).map_err(|source| ChartError::ContractViolation {
            action: action.name().to_string(),
            source,
        })?;
        run.model = patch::apply_patch(&run.model, &result.model_update).map_err(|source| {
            ChartError::PatchApplication {
                action: action.name().to_string(),
                source,
            }
        })?;
        trace!(
            action = action.name(),
            operations = result.model_update.len(),
            "applied action"
        );
        run.outputs.push(result.output);
        Ok(())
    }

    /// A target name as a state, plus whether it named a history pseudostate.
    fn resolve_name(&self, to: &str) -> Result<(StateId, bool), DefinitionError> {
        match history_owner(to) {
            Some(owner) => Ok((self.state_id(owner)?, true)),
            None => Ok((self.state_id(to)?, false)),
        }
    }

    pub(super) fn state_id(&self, name: &str) -> Result<StateId, DefinitionError> {
        self.index
            .id(name)
            .ok_or_else(|| DefinitionError::UnknownState(name.to_string()))
    }
}
