//! The hierarchical automaton interpreter.
//!
//! An [`Automaton`] is compiled from a state tree and a flat transition list
//! by [`AutomatonBuilder`](crate::builder::AutomatonBuilder). It owns its
//! model and resolves every event synchronously, cascading through automatic
//! states until it rests in one that waits for input.

pub mod config;
pub mod machine;
pub(crate) mod table;
pub mod transition;

pub use config::AutomatonConfig;
pub use machine::Automaton;
pub use table::StateRecord;
pub use transition::{Action, ActionResult, AutomatonError, Branch, Transition};
