//! Flat parent/children table over a [`StateTree`].
//!
//! Built once per definition so ancestor walks during dispatch cost
//! O(depth) instead of repeated tree searches.

use super::error::DefinitionError;
use super::tree::{is_history_target, StateNode, StateTree, INITIAL_STATE_NAME};
use std::collections::HashMap;

/// Dense identifier of a state inside a [`StateIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    /// The root pseudostate.
    pub const ROOT: StateId = StateId(0);
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    parent: Option<StateId>,
    children: Vec<StateId>,
    depth: usize,
}

/// Lookup table for names, parents, children and depth of every state.
#[derive(Clone, Debug)]
pub struct StateIndex {
    entries: Vec<Entry>,
    ids: HashMap<String, StateId>,
}

impl StateIndex {
    /// Index a tree. Fails on duplicate or reserved names.
    pub fn build(tree: &StateTree) -> Result<Self, DefinitionError> {
        let mut index = StateIndex {
            entries: vec![Entry {
                name: INITIAL_STATE_NAME.to_string(),
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
            ids: HashMap::from([(INITIAL_STATE_NAME.to_string(), StateId::ROOT)]),
        };
        let mut errors = Vec::new();
        index.insert_children(StateId::ROOT, tree.states(), &mut errors);

        if errors.is_empty() {
            Ok(index)
        } else {
            Err(DefinitionError::from_many(errors))
        }
    }

    fn insert_children(
        &mut self,
        parent: StateId,
        children: &[(String, StateNode)],
        errors: &mut Vec<DefinitionError>,
    ) {
        for (name, node) in children {
            if name == INITIAL_STATE_NAME || is_history_target(name) || name.is_empty() {
                errors.push(DefinitionError::ReservedStateName(name.clone()));
                continue;
            }
            if self.ids.contains_key(name) {
                errors.push(DefinitionError::DuplicateState(name.clone()));
                continue;
            }

            let id = StateId(self.entries.len());
            let depth = self.entries[parent.0].depth + 1;
            self.entries.push(Entry {
                name: name.clone(),
                parent: Some(parent),
                children: Vec::new(),
                depth,
            });
            self.entries[parent.0].children.push(id);
            self.ids.insert(name.clone(), id);
            self.insert_children(id, node.children(), errors);
        }
    }

    pub fn id(&self, name: &str) -> Option<StateId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: StateId) -> &str {
        &self.entries[id.0].name
    }

    pub fn parent(&self, id: StateId) -> Option<StateId> {
        self.entries[id.0].parent
    }

    pub fn children(&self, id: StateId) -> &[StateId] {
        &self.entries[id.0].children
    }

    pub fn depth(&self, id: StateId) -> usize {
        self.entries[id.0].depth
    }

    pub fn is_leaf(&self, id: StateId) -> bool {
        self.entries[id.0].children.is_empty()
    }

    pub fn is_compound(&self, id: StateId) -> bool {
        !self.is_leaf(id)
    }

    /// Number of states, the root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    /// All compound states, the root included, in declaration order.
    pub fn compounds(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.entries.len())
            .map(StateId)
            .filter(|id| self.is_compound(*id))
    }

    /// `id` itself, then each ancestor up to and including the root.
    pub fn ancestors(&self, id: StateId) -> Ancestors<'_> {
        Ancestors {
            index: self,
            next: Some(id),
        }
    }

    /// Whether `ancestor` strictly contains `id`.
    pub fn contains(&self, ancestor: StateId, id: StateId) -> bool {
        if self.depth(ancestor) >= self.depth(id) {
            return false;
        }
        self.ancestors(id).skip(1).any(|a| a == ancestor)
    }
}

/// Iterator over a state and its ancestors.
pub struct Ancestors<'a> {
    index: &'a StateIndex,
    next: Option<StateId>,
}

impl Iterator for Ancestors<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        let current = self.next?;
        self.next = self.index.parent(current);
        Some(current)
    }
}
