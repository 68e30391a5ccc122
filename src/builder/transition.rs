//! Builder for constructing transitions.

use crate::automaton::{Action, ActionResult, Branch, Transition};
use crate::builder::error::BuildError;
use crate::core::{Guard, Target};
use serde_json::Value;
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// A transition either has a single branch, described with `when`/`to`/
/// `action`, or an ordered list of explicit [`Branch`]es added with
/// [`branch`](Self::branch). When both are used, the single branch is tried
/// first. Omitting `on` declares an automatic transition.
///
/// ```rust
/// use syncflow::automaton::{ActionResult, Branch};
/// use syncflow::builder::TransitionBuilder;
///
/// let transition = TransitionBuilder::<(), i64, String>::new()
///     .from("Idle")
///     .on("submit")
///     .branch(Branch::to("Rejected").when(|_, n: &i64, _| *n < 0))
///     .branch(Branch::to("Accepted").action(|_, n: &i64, _| ActionResult::output(n.to_string())))
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.branches.len(), 2);
/// ```
pub struct TransitionBuilder<S, E, O> {
    from: Option<String>,
    event: Option<String>,
    target: Option<Target>,
    guard: Option<Guard<S, E>>,
    action: Option<Action<S, E, O>>,
    branches: Vec<Branch<S, E, O>>,
}

impl<S, E, O> TransitionBuilder<S, E, O> {
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            target: None,
            guard: None,
            action: None,
            branches: Vec::new(),
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the triggering event. Without it the transition is automatic.
    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the target of the single branch.
    pub fn to(mut self, target: impl Into<Target>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn guard(mut self, guard: Guard<S, E>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &E, &S) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Value, &E, &S) -> ActionResult<O> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Append an explicit branch. Branches are tried in the order added.
    pub fn branch(mut self, branch: Branch<S, E, O>) -> Self {
        self.branches.push(branch);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, E, O>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;

        let mut branches = Vec::with_capacity(self.branches.len() + 1);
        match self.target {
            Some(target) => {
                branches.push(Branch {
                    guard: self.guard,
                    target,
                    action: self.action,
                });
            }
            None if self.branches.is_empty() => return Err(BuildError::MissingTarget),
            None => {}
        }
        branches.extend(self.branches);

        Ok(Transition {
            from,
            event: self.event,
            branches,
        })
    }
}

impl<S, E, O> Default for TransitionBuilder<S, E, O> {
    fn default() -> Self {
        Self::new()
    }
}
