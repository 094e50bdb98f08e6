//! Declared transitions.

use super::registry::{Action, Predicate};
use super::tree::{is_history_target, INITIAL_STATE_NAME, INIT_EVENT};

/// One alternative of a guarded transition.
#[derive(Clone, Debug)]
pub struct GuardClause {
    pub predicate: Predicate,
    /// `None` makes the clause an internal transition.
    pub to: Option<String>,
    pub action: Option<Action>,
}

/// What a transition does once it is selected.
#[derive(Clone, Debug)]
pub enum TransitionTarget {
    /// Always taken when the event matches.
    Unconditional {
        to: Option<String>,
        action: Option<Action>,
    },
    /// First clause whose predicate holds, in declaration order.
    Guarded(Vec<GuardClause>),
}

/// A declared transition.
///
/// A transition without an event is automatic: it is keyed on
/// [`INIT_EVENT`], so it is the entry transition of a compound state and
/// fires as soon as a leaf is reached.
#[derive(Clone, Debug)]
pub struct Transition {
    pub from: String,
    pub event: Option<String>,
    pub target: TransitionTarget,
}

impl Transition {
    /// The event this transition responds to.
    pub fn trigger(&self) -> &str {
        self.event.as_deref().unwrap_or(INIT_EVENT)
    }

    /// Whether this fires on entry rather than on an external event.
    pub fn is_automatic(&self) -> bool {
        self.trigger() == INIT_EVENT
    }

    pub fn is_from_root(&self) -> bool {
        self.from == INITIAL_STATE_NAME
    }

    /// Every `(predicate, to, action)` alternative, flattened.
    pub fn alternatives(&self) -> Vec<Alternative<'_>> {
        match &self.target {
            TransitionTarget::Unconditional { to, action } => vec![Alternative {
                predicate: None,
                to: to.as_deref(),
                action: action.as_ref(),
            }],
            TransitionTarget::Guarded(clauses) => clauses
                .iter()
                .map(|clause| Alternative {
                    predicate: Some(&clause.predicate),
                    to: clause.to.as_deref(),
                    action: clause.action.as_ref(),
                })
                .collect(),
        }
    }

    /// Every named target, history targets included.
    pub fn targets(&self) -> Vec<&str> {
        self.alternatives().into_iter().filter_map(|a| a.to).collect()
    }

    pub fn has_history_target(&self) -> bool {
        self.targets().into_iter().any(is_history_target)
    }
}

/// A borrowed view of one way a transition can resolve.
#[derive(Clone, Copy, Debug)]
pub struct Alternative<'a> {
    pub predicate: Option<&'a Predicate>,
    pub to: Option<&'a str>,
    pub action: Option<&'a Action>,
}
