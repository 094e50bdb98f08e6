//! Builder for chart definitions.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{ChartDefinition, StateTree, Transition};

/// Builder assembling a state tree and its transitions.
#[derive(Default)]
pub struct ChartBuilder {
    states: StateTree,
    transitions: Vec<Transition>,
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state tree.
    pub fn states(mut self, states: StateTree) -> Self {
        self.states = states;
        self
    }

    /// Build `builder` and append the transition, in declaration order.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    pub fn add_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Append transitions, keeping their order.
    pub fn transitions(mut self, transitions: Vec<Transition>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build and validate the definition.
    pub fn build(self) -> Result<ChartDefinition, BuildError> {
        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let definition = ChartDefinition::new(self.states, self.transitions);
        definition.validate()?;
        Ok(definition)
    }
}
