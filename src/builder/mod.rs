//! Builder API for automaton construction.
//!
//! Definitions are assembled with fluent builders and the [`state_tree!`]
//! macro, then validated as a whole when [`AutomatonBuilder::build`] is
//! called.
//!
//! [`state_tree!`]: crate::state_tree

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::{BuildError, DefinitionError};
pub use machine::AutomatonBuilder;
pub use transition::TransitionBuilder;

use crate::automaton::{Branch, Transition};
use crate::core::Target;
use serde_json::Value;

/// Create an unguarded transition with no action.
///
/// # Example
///
/// ```
/// use syncflow::builder::simple_transition;
///
/// let transition = simple_transition::<(), (), ()>("Off", "toggle", "On");
/// assert_eq!(transition.event.as_deref(), Some("toggle"));
/// ```
pub fn simple_transition<S, E, O>(
    from: impl Into<String>,
    event: impl Into<String>,
    to: impl Into<Target>,
) -> Transition<S, E, O> {
    Transition {
        from: from.into(),
        event: Some(event.into()),
        branches: vec![Branch::to(to)],
    }
}

/// Create a transition with a guard predicate and no action.
///
/// # Example
///
/// ```
/// use syncflow::builder::guarded_transition;
/// use serde_json::json;
///
/// let transition = guarded_transition::<(), i32, (), _>("Idle", "n", "Positive", |_, n, _| *n > 0);
/// assert!(transition.branches[0].can_fire(&json!({}), &1, &()));
/// ```
pub fn guarded_transition<S, E, O, F>(
    from: impl Into<String>,
    event: impl Into<String>,
    to: impl Into<Target>,
    guard: F,
) -> Transition<S, E, O>
where
    F: Fn(&Value, &E, &S) -> bool + Send + Sync + 'static,
{
    Transition {
        from: from.into(),
        event: Some(event.into()),
        branches: vec![Branch::to(to).when(guard)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{INIT_EVENT, ROOT_STATE};
    use crate::state_tree;
    use serde_json::json;

    #[test]
    fn simple_transition_builds() {
        let transition = simple_transition::<(), (), ()>("A", "go", "B");

        assert_eq!(transition.from, "A");
        assert_eq!(transition.branches[0].target, Target::state("B"));
        assert!(transition.branches[0].can_fire(&json!({}), &(), &()));
    }

    #[test]
    fn guarded_transition_respects_guard() {
        let transition =
            guarded_transition::<(), i32, (), _>("A", "go", "B", |_, n: &i32, _| *n % 2 == 0);

        assert!(transition.branches[0].can_fire(&json!({}), &2, &()));
        assert!(!transition.branches[0].can_fire(&json!({}), &3, &()));
    }

    #[test]
    fn helper_transitions_drive_an_automaton() {
        let mut automaton = AutomatonBuilder::<(), i32, ()>::new()
            .states(state_tree! { Idle, Even, Odd })
            .events(["n"])
            .transitions(vec![
                simple_transition(ROOT_STATE, INIT_EVENT, "Idle"),
                guarded_transition("Idle", "n", "Even", |_, n: &i32, _| n % 2 == 0),
                simple_transition("Idle", "n", "Odd"),
            ])
            .build(())
            .unwrap();
        automaton.start().unwrap();

        automaton.yield_event("n", 3).unwrap();

        assert_eq!(automaton.current_state(), "Odd");
    }
}
