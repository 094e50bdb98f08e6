//! Builder for declaring transitions.

use crate::builder::error::BuildError;
use crate::core::{
    history_of, Action, GuardClause, Predicate, Transition, TransitionTarget, INIT_EVENT,
};

/// Builder for transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::TransitionBuilder;
/// use statecraft::core::Predicate;
/// use serde_json::Value;
///
/// let is_last_track = Predicate::new("is_last_track", |_: &Value, _: &Value, _: &Value| false);
/// let is_not_last_track = Predicate::new("is_not_last_track", |_: &Value, _: &Value, _: &Value| true);
///
/// let transition = TransitionBuilder::new()
///     .from("cd_loaded_group")
///     .on("NEXT_TRACK")
///     .guard(is_last_track, "cd_stopped", None)
///     .guard(is_not_last_track, "history.cd_loaded_group", None)
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.targets(), vec!["cd_stopped", "history.cd_loaded_group"]);
/// ```
#[derive(Default)]
pub struct TransitionBuilder {
    from: Option<String>,
    event: Option<String>,
    to: Option<String>,
    action: Option<Action>,
    guards: Vec<GuardClause>,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the triggering event. Leave unset for an automatic transition.
    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Make this the entry transition of its source state.
    pub fn on_entry(self) -> Self {
        self.on(INIT_EVENT)
    }

    /// Set the target state.
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Target the deep history of a compound state.
    pub fn to_history(self, compound: &str) -> Self {
        self.to(history_of(compound))
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Append a guard clause. Clauses are tried in the order added.
    pub fn guard(
        mut self,
        predicate: Predicate,
        to: impl Into<String>,
        action: Option<Action>,
    ) -> Self {
        self.guards.push(GuardClause {
            predicate,
            to: Some(to.into()),
            action,
        });
        self
    }

    /// Append a prepared clause, e.g. one without a target.
    pub fn clause(mut self, clause: GuardClause) -> Self {
        self.guards.push(clause);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let direct = self.to.is_some() || self.action.is_some();

        let target = match (direct, self.guards.is_empty()) {
            (true, false) => return Err(BuildError::ConflictingTargets(from)),
            (false, true) => return Err(BuildError::EmptyTransition(from)),
            (true, true) => TransitionTarget::Unconditional {
                to: self.to,
                action: self.action,
            },
            (false, false) => TransitionTarget::Guarded(self.guards),
        };

        Ok(Transition {
            from,
            event: self.event,
            target,
        })
    }
}
