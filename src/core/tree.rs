//! The nested naming of control states.
//!
//! A [`StateTree`] is passive data: it only records which states exist and
//! how they nest. Children keep their declaration order, which matters for
//! export and for reading definitions back from JSON.

use super::error::DefinitionError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Name of the synthetic root pseudostate.
pub const INITIAL_STATE_NAME: &str = "nok";

/// Reserved event fired when a state is entered. Never sent by callers.
pub const INIT_EVENT: &str = "init";

/// Prefix turning a compound state name into a history target.
pub const HISTORY_PREFIX: &str = "history.";

/// Suffix token naming history pseudostates in exported diagrams.
pub const HISTORY_STATE_NAME: &str = "H";

/// A node of the state tree.
#[derive(Clone, Debug, PartialEq)]
pub enum StateNode {
    /// An occupiable state with no children.
    Leaf,
    /// A state with ordered children, only traversed through to a leaf.
    Compound(Vec<(String, StateNode)>),
}

impl StateNode {
    /// Build a compound node from `(name, node)` pairs.
    pub fn compound<I, N>(children: I) -> Self
    where
        I: IntoIterator<Item = (N, StateNode)>,
        N: Into<String>,
    {
        let children: Vec<_> = children
            .into_iter()
            .map(|(name, node)| (name.into(), node))
            .collect();
        if children.is_empty() {
            StateNode::Leaf
        } else {
            StateNode::Compound(children)
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, StateNode::Leaf)
    }

    /// Children in declaration order (empty for a leaf).
    pub fn children(&self) -> &[(String, StateNode)] {
        match self {
            StateNode::Leaf => &[],
            StateNode::Compound(children) => children,
        }
    }

    fn from_json(value: &Value, path: &str) -> Result<Self, DefinitionError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(StateNode::Leaf),
            Value::Null => Ok(StateNode::Leaf),
            Value::Object(map) => {
                let children = map
                    .iter()
                    .map(|(name, child)| {
                        StateNode::from_json(child, name).map(|node| (name.clone(), node))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(StateNode::compound(children))
            }
            other => Err(DefinitionError::Malformed(format!(
                "state '{path}' must be an empty string or an object, found {other}"
            ))),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            StateNode::Leaf => Value::String(String::new()),
            StateNode::Compound(children) => Value::Object(
                children
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

/// The children of the root pseudostate.
///
/// The root itself is implicit and always named [`INITIAL_STATE_NAME`].
///
/// # Example
///
/// ```rust
/// use statecraft::core::{StateNode, StateTree};
/// use serde_json::json;
///
/// let tree = StateTree::from_json(&json!({ "A": { "B": "", "C": "" } })).unwrap();
/// let expected = StateTree::new(vec![(
///     "A",
///     StateNode::compound(vec![("B", StateNode::Leaf), ("C", StateNode::Leaf)]),
/// )]);
/// assert_eq!(tree, expected);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateTree {
    top: Vec<(String, StateNode)>,
}

impl StateTree {
    pub fn new<I, N>(top: I) -> Self
    where
        I: IntoIterator<Item = (N, StateNode)>,
        N: Into<String>,
    {
        Self {
            top: top.into_iter().map(|(n, node)| (n.into(), node)).collect(),
        }
    }

    /// Read the `{name: "" | {children}}` JSON shape.
    pub fn from_json(value: &Value) -> Result<Self, DefinitionError> {
        match StateNode::from_json(value, INITIAL_STATE_NAME)? {
            StateNode::Compound(top) => Ok(Self { top }),
            StateNode::Leaf => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> Value {
        self.root().to_json()
    }

    /// Top-level states in declaration order.
    pub fn states(&self) -> &[(String, StateNode)] {
        &self.top
    }

    /// The root pseudostate as a node.
    pub fn root(&self) -> StateNode {
        StateNode::Compound(self.top.clone())
    }

    /// Every state name, depth first, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        fn walk<'a>(children: &'a [(String, StateNode)], out: &mut Vec<&'a str>) {
            for (name, node) in children {
                out.push(name);
                walk(node.children(), out);
            }
        }
        let mut out = Vec::new();
        walk(&self.top, &mut out);
        out
    }
}

impl Serialize for StateTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.top.len()))?;
        for (name, node) in &self.top {
            map.serialize_entry(name, &node.to_json())?;
        }
        map.end()
    }
}

/// Whether a transition target names a history pseudostate.
pub fn is_history_target(target: &str) -> bool {
    target.starts_with(HISTORY_PREFIX)
}

/// The compound state a history target refers to.
pub fn history_owner(target: &str) -> Option<&str> {
    target.strip_prefix(HISTORY_PREFIX)
}

/// Build the history target for a compound state.
pub fn history_of(state: &str) -> String {
    format!("{HISTORY_PREFIX}{state}")
}
