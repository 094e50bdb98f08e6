//! Named predicates and actions.
//!
//! Every guard predicate and transition action carries an explicit string
//! identifier supplied when it is defined. The interpreter logs with it and
//! the exporters print it; nothing ever inspects the closure itself.

use crate::patch::PatchOperation;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type PredicateFn = dyn Fn(&Value, &Value, &Value) -> bool + Send + Sync;
type ActionFn = dyn Fn(&Value, &Value, &Value) -> ActionResult + Send + Sync;

/// What an action hands back: the model edits to apply and an output value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionResult {
    pub model_update: Vec<PatchOperation>,
    pub output: Value,
}

impl ActionResult {
    pub fn new(model_update: Vec<PatchOperation>, output: Value) -> Self {
        Self {
            model_update,
            output,
        }
    }

    /// An output with no model change.
    pub fn output(output: Value) -> Self {
        Self {
            model_update: Vec::new(),
            output,
        }
    }
}

/// Pure predicate deciding whether a guard clause applies.
///
/// Called as `predicate(model, payload, settings)`. Predicates must not have
/// side effects; the interpreter does not check this.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Predicate;
/// use serde_json::{json, Value};
///
/// let is_last_track = Predicate::new("is_last_track", |model: &Value, _: &Value, _: &Value| {
///     model["track"] == model["track_count"]
/// });
///
/// assert_eq!(is_last_track.name(), "is_last_track");
/// assert!(is_last_track.check(&json!({ "track": 3, "track_count": 3 }), &Value::Null, &Value::Null));
/// ```
#[derive(Clone)]
pub struct Predicate {
    name: String,
    predicate: Arc<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, &Value, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, model: &Value, payload: &Value, settings: &Value) -> bool {
        (self.predicate)(model, payload, settings)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

/// Transition action, called as `action(model, payload, settings)`.
///
/// The action sees the model before its own update is applied.
#[derive(Clone)]
pub struct Action {
    name: String,
    action: Arc<ActionFn>,
}

impl Action {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Value, &Value, &Value) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            action: Arc::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, model: &Value, payload: &Value, settings: &Value) -> ActionResult {
        (self.action)(model, payload, settings)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.name).finish()
    }
}

/// Name-indexed store of predicates and actions.
///
/// Used to turn a serialized definition, where functions appear only by
/// name, back into a runnable one.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    predicates: HashMap<String, Predicate>,
    actions: HashMap<String, Action>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate, returning the handle for direct use.
    pub fn predicate<F>(&mut self, name: impl Into<String>, predicate: F) -> Predicate
    where
        F: Fn(&Value, &Value, &Value) -> bool + Send + Sync + 'static,
    {
        let predicate = Predicate::new(name, predicate);
        self.predicates
            .insert(predicate.name().to_string(), predicate.clone());
        predicate
    }

    /// Register an action, returning the handle for direct use.
    pub fn action<F>(&mut self, name: impl Into<String>, action: F) -> Action
    where
        F: Fn(&Value, &Value, &Value) -> ActionResult + Send + Sync + 'static,
    {
        let action = Action::new(name, action);
        self.actions
            .insert(action.name().to_string(), action.clone());
        action
    }

    pub fn get_predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn get_action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }
}
