//! Chart definitions and their validation.
//!
//! Validation accumulates every problem in one pass instead of stopping at
//! the first one, using Stillwater's `Validation`.

use super::error::DefinitionError;
use super::index::StateIndex;
use super::registry::{Action, Predicate, Registry};
use super::transition::{GuardClause, Transition, TransitionTarget};
use super::tree::{history_owner, StateTree};
use serde::Deserialize;
use serde_json::Value;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionError>>;

fn check(holds: bool, error: impl FnOnce() -> DefinitionError) -> Check {
    if holds {
        Validation::success(())
    } else {
        Validation::fail(error())
    }
}

/// A state tree together with its transition table.
///
/// Both are treated as immutable once handed to an interpreter.
#[derive(Clone, Debug, Default)]
pub struct ChartDefinition {
    pub states: StateTree,
    pub transitions: Vec<Transition>,
}

impl ChartDefinition {
    pub fn new(states: StateTree, transitions: Vec<Transition>) -> Self {
        Self {
            states,
            transitions,
        }
    }

    /// Check the definition, returning its state index when it is sound.
    ///
    /// All problems found are reported together.
    pub fn validate(&self) -> Result<StateIndex, DefinitionError> {
        let index = StateIndex::build(&self.states)?;

        let mut checks = vec![check(!index.is_empty(), || DefinitionError::EmptyChart)];
        for transition in &self.transitions {
            checks.extend(self.check_transition(&index, transition));
        }
        for compound in index.compounds() {
            let name = index.name(compound);
            let has_entry = self
                .transitions
                .iter()
                .any(|t| t.from == name && t.is_automatic());
            checks.push(check(has_entry, || {
                DefinitionError::MissingEntryTransition(name.to_string())
            }));
        }

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(_) => Ok(index),
            Validation::Failure(errors) => Err(DefinitionError::from_many(
                errors.iter().cloned().collect(),
            )),
        }
    }

    fn check_transition(&self, index: &StateIndex, transition: &Transition) -> Vec<Check> {
        let from = index.id(&transition.from);
        let mut checks = vec![check(from.is_some(), || {
            DefinitionError::UnknownState(transition.from.clone())
        })];

        for alternative in transition.alternatives() {
            if let Some(predicate) = alternative.predicate {
                checks.push(named(&transition.from, "predicate", predicate.name()));
            }
            if let Some(action) = alternative.action {
                checks.push(named(&transition.from, "action", action.name()));
            }

            let Some(to) = alternative.to else {
                let entry_of_compound =
                    transition.is_automatic() && from.is_some_and(|id| index.is_compound(id));
                checks.push(check(!entry_of_compound, || {
                    DefinitionError::EntryWithoutTarget(transition.from.clone())
                }));
                continue;
            };

            let target = match history_owner(to) {
                Some(owner) => {
                    let id = index.id(owner).filter(|id| index.is_compound(*id));
                    checks.push(check(id.is_some(), || {
                        DefinitionError::InvalidHistoryTarget(to.to_string())
                    }));
                    id
                }
                None => {
                    let id = index.id(to);
                    checks.push(check(id.is_some(), || {
                        DefinitionError::UnknownState(to.to_string())
                    }));
                    id
                }
            };

            if let (Some(from), Some(target)) = (from, target) {
                if transition.is_automatic() && index.is_compound(from) {
                    checks.push(check(index.contains(from, target), || {
                        DefinitionError::EntryOutsideState {
                            from: transition.from.clone(),
                            to: to.to_string(),
                        }
                    }));
                }
            }
        }
        checks
    }

    /// Read a definition in the `{states, transitions}` JSON shape, resolving
    /// predicate and action names through `registry`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statecraft::core::{ChartDefinition, Registry};
    /// use serde_json::json;
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
    /// assert_eq!(definition.transitions.len(), 3);
    /// assert!(definition.validate().is_ok());
    /// ```
    pub fn from_json(value: &Value, registry: &Registry) -> Result<Self, DefinitionError> {
        let raw: RawDefinition = serde_json::from_value(value.clone())
            .map_err(|e| DefinitionError::Malformed(e.to_string()))?;
        let states = StateTree::from_json(&raw.states)?;
        let transitions = raw
            .transitions
            .into_iter()
            .map(|t| t.resolve(registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(states, transitions))
    }

    /// Transitions declared on `state`, in declaration order.
    pub fn transitions_from<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Transition> {
        self.transitions.iter().filter(move |t| t.from == state)
    }
}

fn named(from: &str, kind: &'static str, name: &str) -> Check {
    check(!name.trim().is_empty(), || DefinitionError::AnonymousFunction {
        from: from.to_string(),
        kind,
    })
}

#[derive(Deserialize)]
struct RawDefinition {
    states: Value,
    #[serde(default)]
    transitions: Vec<RawTransition>,
}

#[derive(Deserialize)]
struct RawTransition {
    from: String,
    event: Option<String>,
    to: Option<String>,
    action: Option<String>,
    guards: Option<Vec<RawGuard>>,
}

#[derive(Deserialize)]
struct RawGuard {
    predicate: String,
    to: Option<String>,
    action: Option<String>,
}

impl RawTransition {
    fn resolve(self, registry: &Registry) -> Result<Transition, DefinitionError> {
        let target = match self.guards {
            Some(_) if self.to.is_some() || self.action.is_some() => {
                return Err(DefinitionError::Malformed(format!(
                    "transition from '{}' declares both guards and a direct target",
                    self.from
                )))
            }
            Some(guards) => TransitionTarget::Guarded(
                guards
                    .into_iter()
                    .map(|g| {
                        Ok(GuardClause {
                            predicate: lookup_predicate(registry, &g.predicate)?,
                            to: g.to,
                            action: lookup_action(registry, g.action.as_deref())?,
                        })
                    })
                    .collect::<Result<Vec<_>, DefinitionError>>()?,
            ),
            None => TransitionTarget::Unconditional {
                to: self.to,
                action: lookup_action(registry, self.action.as_deref())?,
            },
        };
        Ok(Transition {
            from: self.from,
            event: self.event,
            target,
        })
    }
}

fn lookup_predicate(registry: &Registry, name: &str) -> Result<Predicate, DefinitionError> {
    registry
        .get_predicate(name)
        .cloned()
        .ok_or_else(|| DefinitionError::UnknownFunction {
            name: name.to_string(),
            kind: "predicate",
        })
}

fn lookup_action(
    registry: &Registry,
    name: Option<&str>,
) -> Result<Option<Action>, DefinitionError> {
    name.map(|name| {
        registry
            .get_action(name)
            .cloned()
            .ok_or_else(|| DefinitionError::UnknownFunction {
                name: name.to_string(),
                kind: "action",
            })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ActionResult;
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.predicate("always_true", |_: &Value, _: &Value, _: &Value| true);
        registry.action("dummy_action", |_: &Value, _: &Value, _: &Value| {
            ActionResult::default()
        });
        registry
    }

    fn parse(value: Value) -> Result<ChartDefinition, DefinitionError> {
        ChartDefinition::from_json(&value, &registry())
    }

    #[test]
    fn valid_definition_passes() {
        let definition = parse(json!({
            "states": { "A": { "B": "", "C": "" } },
            "transitions": [
                { "from": "nok", "event": "init", "to": "A", "action": "dummy_action" },
                { "from": "A", "event": "init", "to": "B" },
                { "from": "B", "event": "GO", "to": "C" },
                { "from": "C", "event": "BACK", "to": "history.A" }
            ]
        }))
        .unwrap();

        let index = definition.validate().unwrap();
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn empty_state_tree_is_rejected() {
        let definition = parse(json!({ "states": {}, "transitions": [] })).unwrap();

        assert_eq!(definition.validate().unwrap_err(), DefinitionError::EmptyChart);
    }

    #[test]
    fn validation_accumulates_all_problems() {
        let definition = parse(json!({
            "states": { "A": { "B": "" }, "L": "" },
            "transitions": [
                { "from": "nok", "event": "init", "to": "A" },
                { "from": "ghost", "event": "GO", "to": "B" },
                { "from": "B", "event": "GO", "to": "nowhere" },
                { "from": "B", "event": "BACK", "to": "history.L" }
            ]
        }))
        .unwrap();

        match definition.validate() {
            Err(DefinitionError::Multiple(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.contains(&DefinitionError::UnknownState("ghost".into())));
                assert!(errors.contains(&DefinitionError::UnknownState("nowhere".into())));
                assert!(errors.contains(&DefinitionError::InvalidHistoryTarget(
                    "history.L".into()
                )));
                assert!(errors.contains(&DefinitionError::MissingEntryTransition("A".into())));
            }
            other => panic!("expected accumulated errors, got {other:?}"),
        }
    }

    #[test]
    fn entry_must_stay_inside_its_state() {
        let definition = parse(json!({
            "states": { "A": { "B": "" }, "C": "" },
            "transitions": [
                { "from": "nok", "event": "init", "to": "A" },
                { "from": "A", "event": "init", "to": "C" }
            ]
        }))
        .unwrap();

        assert_eq!(
            definition.validate().unwrap_err(),
            DefinitionError::EntryOutsideState {
                from: "A".into(),
                to: "C".into()
            }
        );
    }

    #[test]
    fn anonymous_functions_are_rejected() {
        let definition = ChartDefinition::new(
            StateTree::from_json(&json!({ "A": "" })).unwrap(),
            vec![Transition {
                from: "nok".into(),
                event: Some("init".into()),
                target: TransitionTarget::Unconditional {
                    to: Some("A".into()),
                    action: Some(Action::new("", |_: &Value, _: &Value, _: &Value| {
                        ActionResult::default()
                    })),
                },
            }],
        );

        assert_eq!(
            definition.validate().unwrap_err(),
            DefinitionError::AnonymousFunction {
                from: "nok".into(),
                kind: "action"
            }
        );
    }

    #[test]
    fn unknown_function_names_fail_to_load() {
        let result = parse(json!({
            "states": { "A": "" },
            "transitions": [{ "from": "nok", "event": "init", "to": "A", "action": "missing" }]
        }));

        assert_eq!(
            result.unwrap_err(),
            DefinitionError::UnknownFunction {
                name: "missing".into(),
                kind: "action"
            }
        );
    }

    #[test]
    fn guards_and_direct_target_cannot_mix() {
        let result = parse(json!({
            "states": { "A": "" },
            "transitions": [{
                "from": "nok", "event": "init", "to": "A",
                "guards": [{ "predicate": "always_true", "to": "A" }]
            }]
        }));

        assert!(matches!(result, Err(DefinitionError::Malformed(_))));
    }

    #[test]
    fn eventless_transitions_count_as_entry() {
        let definition = parse(json!({
            "states": { "A": { "B": "" } },
            "transitions": [
                { "from": "nok", "to": "A" },
                { "from": "A", "guards": [{ "predicate": "always_true", "to": "B" }] }
            ]
        }))
        .unwrap();

        assert!(definition.validate().is_ok());
        assert!(definition.transitions_from("A").all(Transition::is_automatic));
        assert_eq!(definition.transitions_from("A").count(), 1);
    }
}
