//! PlantUML state diagram text.

use super::{function_name, ExportOptions};
use crate::core::{
    history_owner, Alternative, ChartDefinition, DefinitionError, StateIndex, StateNode,
    Transition, HISTORY_STATE_NAME, INIT_EVENT,
};

const INDENT: &str = "  ";

/// Render a definition as a PlantUML state diagram.
///
/// Every state becomes a `state "<display name>" as <name>` block, children
/// nested inside their parent. Entry transitions of a compound state are
/// drawn from `[*]` inside that state's block; every other transition
/// becomes one arrow per guard clause after the blocks. Labels read
/// `event [predicate] / action` with empty parts left out.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::entry;
/// use statecraft::core::{ChartDefinition, StateTree, INITIAL_STATE_NAME};
/// use statecraft::export::{to_plantuml, ExportOptions};
/// use serde_json::json;
///
/// let definition = ChartDefinition::new(
///     StateTree::from_json(&json!({ "A": "" })).unwrap(),
///     vec![entry(INITIAL_STATE_NAME, "A")],
/// );
///
/// let text = to_plantuml(&definition, &ExportOptions::default()).unwrap();
/// assert_eq!(text, "state \"A\" as A <<NoContent>> {\n}\n\n[*] --> A");
/// ```
pub fn to_plantuml(
    definition: &ChartDefinition,
    _options: &ExportOptions,
) -> Result<String, DefinitionError> {
    let index = StateIndex::build(&definition.states)?;
    let blocks = definition
        .states
        .states()
        .iter()
        .map(|(name, node)| render_state(definition, name, node, 0))
        .collect::<Result<Vec<_>, _>>()?;

    let mut arrows = Vec::new();
    for transition in &definition.transitions {
        if is_nested_entry(&index, transition) {
            continue;
        }
        arrows.extend(render_transition(transition, 0)?);
    }

    let mut text = blocks.join("\n");
    if !arrows.is_empty() {
        text.push_str("\n\n");
        text.push_str(&arrows.join("\n"));
    }
    Ok(text)
}

/// Entry transitions of compound states are drawn inside their block.
fn is_nested_entry(index: &StateIndex, transition: &Transition) -> bool {
    !transition.is_from_root()
        && transition.is_automatic()
        && index
            .id(&transition.from)
            .is_some_and(|id| index.is_compound(id))
}

fn render_state(
    definition: &ChartDefinition,
    name: &str,
    node: &StateNode,
    depth: usize,
) -> Result<String, DefinitionError> {
    let pad = INDENT.repeat(depth);
    let header = format!("{pad}state \"{}\" as {name}", display_name(name));

    if node.is_leaf() {
        return Ok(format!("{header} <<NoContent>> {{\n{pad}}}"));
    }

    let mut lines = node
        .children()
        .iter()
        .map(|(child, node)| render_state(definition, child, node, depth + 1))
        .collect::<Result<Vec<_>, _>>()?;
    for transition in definition.transitions_from(name) {
        if transition.is_automatic() {
            lines.extend(render_transition(transition, depth + 1)?);
        }
    }

    Ok(format!("{header} {{\n{}\n{pad}}}", lines.join("\n")))
}

/// One line per alternative of `transition`.
fn render_transition(
    transition: &Transition,
    depth: usize,
) -> Result<Vec<String>, DefinitionError> {
    let pad = INDENT.repeat(depth);
    let entry = transition.is_automatic() && (transition.is_from_root() || depth > 0);

    transition
        .alternatives()
        .into_iter()
        .map(|alternative| {
            let label = format_label(transition, &alternative)?;
            let line = match alternative.to {
                // Internal transitions render as a state description.
                None => format!("{}{} : {}", pad, transition.from, label.trim_start()),
                Some(to) => {
                    let source = if entry { "[*]" } else { transition.from.as_str() };
                    let target = match history_owner(to) {
                        Some(owner) => history_state_name(&transition.from, owner),
                        None => to.to_string(),
                    };
                    if label.is_empty() {
                        format!("{pad}{source} --> {target}")
                    } else {
                        format!("{pad}{source} --> {target} : {label}")
                    }
                }
            };
            Ok(line)
        })
        .collect()
}

fn format_label(
    transition: &Transition,
    alternative: &Alternative<'_>,
) -> Result<String, DefinitionError> {
    let event = match transition.trigger() {
        INIT_EVENT => "",
        event => event,
    };
    let predicate = alternative
        .predicate
        .map(|p| function_name(&transition.from, "predicate", p.name()))
        .transpose()?;
    let action = alternative
        .action
        .map(|a| function_name(&transition.from, "action", a.name()))
        .transpose()?;

    Ok(match (predicate, action) {
        (Some(predicate), Some(action)) => format!("{event} [{predicate}] / {action}"),
        (Some(predicate), None) => format!("{event} [{predicate}]"),
        (None, Some(action)) => format!("{event} / {action}"),
        (None, None) => event.to_string(),
    })
}

/// Name of the history pseudostate drawn for a history target.
fn history_state_name(from: &str, owner: &str) -> String {
    format!("{from}.{owner}.{HISTORY_STATE_NAME}")
}

fn display_name(name: &str) -> String {
    name.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{entry, simple_transition};
    use crate::core::{
        Action, ActionResult, GuardClause, Predicate, StateTree, TransitionTarget,
        INITIAL_STATE_NAME,
    };
    use serde_json::{json, Value};

    fn predicate(name: &str, value: bool) -> Predicate {
        Predicate::new(name, move |_: &Value, _: &Value, _: &Value| value)
    }

    fn action(name: &str) -> Action {
        Action::new(name, |_: &Value, _: &Value, _: &Value| ActionResult::default())
    }

    #[test]
    fn guarded_entry_without_event() {
        let definition = ChartDefinition::new(
            StateTree::from_json(&json!({ "A": "" })).unwrap(),
            vec![Transition {
                from: INITIAL_STATE_NAME.into(),
                event: Some(INIT_EVENT.into()),
                target: TransitionTarget::Guarded(vec![
                    GuardClause {
                        predicate: predicate("always_true", true),
                        to: Some("A".into()),
                        action: Some(action("dummy_action")),
                    },
                    GuardClause {
                        predicate: predicate("always_false", false),
                        to: Some("A".into()),
                        action: Some(action("another_dummy_action")),
                    },
                ]),
            }],
        );

        let text = to_plantuml(&definition, &ExportOptions::default()).unwrap();

        assert_eq!(
            text,
            "state \"A\" as A <<NoContent>> {\n}\n\n\
             [*] --> A :  [always_true] / dummy_action\n\
             [*] --> A :  [always_false] / another_dummy_action"
        );
    }

    #[test]
    fn compound_entry_is_nested() {
        let definition = ChartDefinition::new(
            StateTree::from_json(&json!({ "door_group": { "open": "", "closed": "" } })).unwrap(),
            vec![
                entry(INITIAL_STATE_NAME, "door_group"),
                entry("door_group", "closed"),
                simple_transition("closed", "OPEN", "open"),
            ],
        );

        let text = to_plantuml(&definition, &ExportOptions::default()).unwrap();

        assert_eq!(
            text,
            "state \"door group\" as door_group {\n\
             \x20 state \"open\" as open <<NoContent>> {\n  }\n\
             \x20 state \"closed\" as closed <<NoContent>> {\n  }\n\
             \x20 [*] --> closed\n\
             }\n\n\
             [*] --> door_group\n\
             closed --> open : OPEN"
        );
    }

    #[test]
    fn history_target_gets_pseudostate_name() {
        let definition = ChartDefinition::new(
            StateTree::from_json(&json!({ "group": { "a": "" }, "away": "" })).unwrap(),
            vec![
                entry(INITIAL_STATE_NAME, "group"),
                entry("group", "a"),
                simple_transition("away", "BACK", "history.group"),
            ],
        );

        let text = to_plantuml(&definition, &ExportOptions::default()).unwrap();

        assert!(text.ends_with("away --> away.group.H : BACK"));
    }

    #[test]
    fn internal_transition_is_a_description() {
        let definition = ChartDefinition::new(
            StateTree::from_json(&json!({ "A": "" })).unwrap(),
            vec![
                entry(INITIAL_STATE_NAME, "A"),
                Transition {
                    from: "A".into(),
                    event: Some("TICK".into()),
                    target: TransitionTarget::Unconditional {
                        to: None,
                        action: Some(action("count")),
                    },
                },
            ],
        );

        let text = to_plantuml(&definition, &ExportOptions::default()).unwrap();

        assert!(text.ends_with("A : TICK / count"));
    }

    #[test]
    fn entry_from_a_leaf_stays_top_level() {
        let definition = ChartDefinition::new(
            StateTree::from_json(&json!({ "group": { "inner": "" }, "A": "", "B": "" })).unwrap(),
            vec![
                entry(INITIAL_STATE_NAME, "A"),
                entry("group", "inner"),
                entry("A", "B"),
            ],
        );

        let text = to_plantuml(&definition, &ExportOptions::default()).unwrap();

        assert!(text.contains("  [*] --> inner\n}"));
        assert!(text.ends_with("[*] --> A\nA --> B"));
    }

    #[test]
    fn duplicate_state_names_cannot_be_drawn() {
        let definition = ChartDefinition::new(
            StateTree::new(vec![
                ("A".to_string(), StateNode::Leaf),
                ("A".to_string(), StateNode::Leaf),
            ]),
            vec![entry(INITIAL_STATE_NAME, "A")],
        );

        let result = to_plantuml(&definition, &ExportOptions::default());

        assert!(matches!(result, Err(DefinitionError::DuplicateState(_))));
    }

    #[test]
    fn anonymous_predicate_is_rejected() {
        let definition = ChartDefinition::new(
            StateTree::from_json(&json!({ "A": "", "B": "" })).unwrap(),
            vec![
                entry(INITIAL_STATE_NAME, "A"),
                Transition {
                    from: "A".into(),
                    event: Some("GO".into()),
                    target: TransitionTarget::Guarded(vec![GuardClause {
                        predicate: predicate(" ", true),
                        to: Some("B".into()),
                        action: None,
                    }]),
                },
            ],
        );

        let result = to_plantuml(&definition, &ExportOptions::default());

        assert_eq!(
            result.unwrap_err(),
            DefinitionError::AnonymousFunction {
                from: "A".into(),
                kind: "predicate"
            }
        );
    }
}
