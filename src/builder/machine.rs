//! Builder for configuring interpreters.

use crate::builder::error::BuildError;
use crate::core::ChartDefinition;
use crate::interpreter::Interpreter;
use serde_json::{Map, Value};

/// Interpreter configuration with a fluent API.
///
/// Defaults: an empty object as initial model, `null` settings and an
/// unbounded transition trace.
#[derive(Default)]
pub struct InterpreterBuilder {
    definition: Option<ChartDefinition>,
    initial_model: Option<Value>,
    settings: Option<Value>,
    log_capacity: Option<usize>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chart definition (required).
    pub fn definition(mut self, definition: ChartDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn initial_model(mut self, model: Value) -> Self {
        self.initial_model = Some(model);
        self
    }

    /// Settings passed unchanged to every predicate and action.
    pub fn settings(mut self, settings: Value) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Keep only the most recent `capacity` trace records.
    pub fn log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = Some(capacity);
        self
    }

    /// Build the interpreter. It still needs `initialize()`.
    pub fn build(self) -> Result<Interpreter, BuildError> {
        let definition = self.definition.ok_or(BuildError::MissingDefinition)?;
        let model = self
            .initial_model
            .unwrap_or_else(|| Value::Object(Map::new()));
        let settings = self.settings.unwrap_or(Value::Null);

        let interpreter = Interpreter::new(definition, model, settings)?;
        Ok(match self.log_capacity {
            Some(capacity) => interpreter.with_log_capacity(capacity),
            None => interpreter,
        })
    }
}
