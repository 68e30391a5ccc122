//! Declarations shared by the automaton builder and interpreter.
//!
//! - State hierarchies via [`StateTree`] and transition targets via [`Target`]
//! - Guard predicates for transition selection
//! - A bounded trace of executed transitions

mod guard;
mod state;
mod trace;

pub use guard::Guard;
pub use state::{StateNode, StateTree, Target, AUTO_EVENT, INIT_EVENT, ROOT_STATE};
pub use trace::{TransitionRecord, TransitionTrace};
