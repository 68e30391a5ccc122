//! Transition types: branches, actions and their results.

use crate::core::{Guard, Target, AUTO_EVENT};
use crate::patch::{PatchError, UpdateOperation};
use serde_json::Value;
use std::sync::Arc;

/// What an action hands back to the interpreter.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionResult<O> {
    /// Applied to the model before the target state is entered
    pub model_update: Vec<UpdateOperation>,
    /// Returned to the caller of `start`/`yield_event`; `None` is the
    /// neutral "no output" value
    pub output: Option<O>,
}

impl<O> ActionResult<O> {
    /// No model change, no output. This is what a branch without an
    /// action produces.
    pub fn none() -> Self {
        Self {
            model_update: Vec::new(),
            output: None,
        }
    }

    /// Emit `output` without changing the model.
    pub fn output(output: O) -> Self {
        Self {
            model_update: Vec::new(),
            output: Some(output),
        }
    }

    /// Change the model without emitting anything.
    pub fn update(model_update: Vec<UpdateOperation>) -> Self {
        Self {
            model_update,
            output: None,
        }
    }

    pub fn with_output(mut self, output: O) -> Self {
        self.output = Some(output);
        self
    }
}

impl<O> Default for ActionResult<O> {
    fn default() -> Self {
        Self::none()
    }
}

/// Action run when a branch fires: `(model, event_data, settings) -> result`.
pub type Action<S, E, O> = Arc<dyn Fn(&Value, &E, &S) -> ActionResult<O> + Send + Sync>;

/// One guarded alternative of a transition.
pub struct Branch<S, E, O> {
    pub guard: Option<Guard<S, E>>,
    pub target: Target,
    pub action: Option<Action<S, E, O>>,
}

impl<S, E, O> Branch<S, E, O> {
    /// An unguarded branch with no action, leading to `target`.
    pub fn to(target: impl Into<Target>) -> Self {
        Self {
            guard: None,
            target: target.into(),
            action: None,
        }
    }

    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &E, &S) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub fn guard(mut self, guard: Guard<S, E>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Value, &E, &S) -> ActionResult<O> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// An absent guard always passes.
    pub fn can_fire(&self, model: &Value, event_data: &E, settings: &S) -> bool {
        self.guard
            .as_ref()
            .is_none_or(|g| g.check(model, event_data, settings))
    }

    pub(crate) fn run(&self, model: &Value, event_data: &E, settings: &S) -> ActionResult<O> {
        match &self.action {
            Some(action) => action(model, event_data, settings),
            None => ActionResult::none(),
        }
    }
}

/// All branches declared for one `(from, event)` pair.
///
/// Branches are tried in order; the first whose guard passes fires.
pub struct Transition<S, E, O> {
    pub from: String,
    /// `None` declares an automatic (eventless) transition
    pub event: Option<String>,
    pub branches: Vec<Branch<S, E, O>>,
}

impl<S, E, O> Transition<S, E, O> {
    pub fn is_automatic(&self) -> bool {
        self.event.is_none()
    }

    /// The event this transition is registered under.
    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or(AUTO_EVENT)
    }
}

/// Errors raised while the interpreter processes an event.
///
/// Definition problems are caught when the automaton is built; these are the
/// failures that can only show up at run time.
#[derive(Debug, thiserror::Error)]
pub enum AutomatonError {
    #[error("Automatic transitions did not settle within {limit} steps (last entered '{state}')")]
    CascadeLimitExceeded { state: String, limit: usize },

    #[error("Model update for event '{event}' in state '{state}' failed: {source}")]
    ModelUpdate {
        state: String,
        event: String,
        #[source]
        source: PatchError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn branch_without_guard_always_fires() {
        let branch: Branch<(), (), ()> = Branch::to("B");

        assert!(branch.can_fire(&json!({}), &(), &()));
    }

    #[test]
    fn branch_respects_guard() {
        let branch: Branch<(), i32, ()> = Branch::to("B").when(|_, n: &i32, _| *n > 0);

        assert!(branch.can_fire(&json!({}), &1, &()));
        assert!(!branch.can_fire(&json!({}), &-1, &()));
    }

    #[test]
    fn branch_without_action_yields_no_output() {
        let branch: Branch<(), (), String> = Branch::to("B");

        let result = branch.run(&json!({}), &(), &());

        assert_eq!(result, ActionResult::none());
    }

    #[test]
    fn branch_action_sees_model_and_data() {
        let branch: Branch<(), i64, i64> = Branch::to("B").action(|model: &Value, n: &i64, _| {
            ActionResult::output(model["base"].as_i64().unwrap_or(0) + n)
        });

        let result = branch.run(&json!({"base": 40}), &2, &());

        assert_eq!(result.output, Some(42));
    }

    #[test]
    fn eventless_transition_registers_under_auto() {
        let transition: Transition<(), (), ()> = Transition {
            from: "A".to_string(),
            event: None,
            branches: vec![Branch::to("B")],
        };

        assert!(transition.is_automatic());
        assert_eq!(transition.event_name(), AUTO_EVENT);
    }
}
