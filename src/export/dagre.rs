//! Structured document for the online Dagre visualizer.

use super::{function_name, ExportOptions};
use crate::core::{
    Action, ChartDefinition, DefinitionError, StateNode, Transition, TransitionTarget,
    INITIAL_STATE_NAME,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of the exported state hierarchy.
///
/// Serializes as a bare string for a leaf and as `[name, [children...]]`
/// for a compound state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateShape {
    Leaf(String),
    Compound(String, Vec<StateShape>),
}

impl StateShape {
    fn from_node(name: &str, node: &StateNode) -> Self {
        match node {
            StateNode::Leaf => StateShape::Leaf(name.to_string()),
            StateNode::Compound(children) => StateShape::Compound(
                name.to_string(),
                children
                    .iter()
                    .map(|(child, node)| StateShape::from_node(child, node))
                    .collect(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StateShape::Leaf(name) | StateShape::Compound(name, _) => name,
        }
    }

    /// Every name in the hierarchy, depth first, this node included.
    pub fn names(&self) -> Vec<&str> {
        let mut out = vec![self.name()];
        if let StateShape::Compound(_, children) = self {
            for child in children {
                out.extend(child.names());
            }
        }
        out
    }

    /// Nesting depth below this node; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            StateShape::Leaf(_) => 0,
            StateShape::Compound(_, children) => {
                1 + children.iter().map(StateShape::depth).max().unwrap_or(0)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedGuard {
    pub predicate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// A transition with its functions replaced by their names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTransition {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guards: Option<Vec<ExportedGuard>>,
}

/// The `{states, transitions}` document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizerDocument {
    pub states: StateShape,
    pub transitions: Vec<ExportedTransition>,
}

impl VisualizerDocument {
    /// The document as the visualizer reads it.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Project a definition into the visualizer's document format.
///
/// The root is always named [`INITIAL_STATE_NAME`]; children keep their
/// declaration order and transitions keep theirs. Nothing is resolved:
/// guards are not evaluated and history targets are copied as written.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::{entry, simple_transition};
/// use statecraft::core::{ChartDefinition, StateTree, INITIAL_STATE_NAME};
/// use statecraft::export::{to_visualizer_format, ExportOptions};
/// use serde_json::json;
///
/// let definition = ChartDefinition::new(
///     StateTree::from_json(&json!({ "A": "", "B": "" })).unwrap(),
///     vec![entry(INITIAL_STATE_NAME, "A"), simple_transition("A", "GO", "B")],
/// );
///
/// let document = to_visualizer_format(&definition, &ExportOptions::default()).unwrap();
/// assert_eq!(document.to_json().unwrap()["states"], json!(["nok", ["A", "B"]]));
/// ```
pub fn to_visualizer_format(
    definition: &ChartDefinition,
    _options: &ExportOptions,
) -> Result<VisualizerDocument, DefinitionError> {
    let states = StateShape::Compound(
        INITIAL_STATE_NAME.to_string(),
        definition
            .states
            .states()
            .iter()
            .map(|(name, node)| StateShape::from_node(name, node))
            .collect(),
    );
    let transitions = definition
        .transitions
        .iter()
        .map(export_transition)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VisualizerDocument {
        states,
        transitions,
    })
}

fn export_transition(transition: &Transition) -> Result<ExportedTransition, DefinitionError> {
    let from = &transition.from;
    let action_name = |action: Option<&Action>| {
        action
            .map(|a| function_name(from, "action", a.name()).map(str::to_string))
            .transpose()
    };

    let mut exported = ExportedTransition {
        from: from.clone(),
        to: None,
        event: transition.event.clone(),
        action: None,
        guards: None,
    };
    match &transition.target {
        TransitionTarget::Unconditional { to, action } => {
            exported.to = to.clone();
            exported.action = action_name(action.as_ref())?;
        }
        TransitionTarget::Guarded(clauses) => {
            let guards = clauses
                .iter()
                .map(|clause| {
                    Ok(ExportedGuard {
                        predicate: function_name(from, "predicate", clause.predicate.name())?
                            .to_string(),
                        to: clause.to.clone(),
                        action: action_name(clause.action.as_ref())?,
                    })
                })
                .collect::<Result<Vec<_>, DefinitionError>>()?;
            exported.guards = Some(guards);
        }
    }
    Ok(exported)
}
