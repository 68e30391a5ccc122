//! Syncflow: a synchronous hierarchical automaton and a pull-based dataflow
//! library built on it.
//!
//! The automaton is defined once and then driven one event at a time. Each
//! call runs to completion: guards are tried in declaration order, the
//! selected action's model update is applied, and automatic states cascade
//! until the automaton rests in a state that waits for input.
//!
//! Signals are values recomputed on demand. Each pull reports whether the
//! value changed, stayed the same, failed or completed, so downstream
//! combinators only recompute what actually changed.
//!
//! # Core Concepts
//!
//! - **State tree**: nested declaration of grouping and leaf states
//! - **Transitions**: ordered guarded branches, inherited by child states
//! - **History**: re-entry of the last active leaf of a group
//! - **Model**: a JSON object private to the automaton, changed only through
//!   update operations returned by actions
//! - **Signals**: `pull()`/`get()` values classified as `NEW`, `SAME`,
//!   `ERROR` or `DONE`
//!
//! # Example
//!
//! ```rust
//! use syncflow::automaton::ActionResult;
//! use syncflow::builder::{AutomatonBuilder, TransitionBuilder};
//! use syncflow::core::{Target, INIT_EVENT, ROOT_STATE};
//! use syncflow::state_tree;
//!
//! let mut player = AutomatonBuilder::<(), (), String>::new()
//!     .states(state_tree! {
//!         Stopped,
//!         Active => { Playing, Paused },
//!     })
//!     .events(["play", "pause", "stop", "resume"])
//!     .transition(TransitionBuilder::new().from(ROOT_STATE).on(INIT_EVENT).to("Stopped"))?
//!     .transition(TransitionBuilder::new().from("Stopped").on("play").to("Playing"))?
//!     .transition(TransitionBuilder::new().from("Playing").on("pause").to("Paused"))?
//!     .transition(
//!         TransitionBuilder::new()
//!             .from("Active")
//!             .on("stop")
//!             .to("Stopped")
//!             .action(|_, _, _| ActionResult::output("stopped".to_string())),
//!     )?
//!     .transition(TransitionBuilder::new().from("Stopped").on("resume").to(Target::history("Active")))?
//!     .build(())?;
//!
//! player.start()?;
//! player.yield_event("play", ())?;
//! player.yield_event("pause", ())?;
//! assert_eq!(player.yield_event("stop", ())?.as_deref(), Some("stopped"));
//!
//! player.yield_event("resume", ())?;
//! assert_eq!(player.current_state(), "Paused");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod automaton;
pub mod builder;
pub mod core;
pub mod patch;
pub mod signal;

// Re-export commonly used types
pub use automaton::{ActionResult, Automaton, AutomatonConfig, AutomatonError, Branch};
pub use builder::{AutomatonBuilder, BuildError, TransitionBuilder};
pub use crate::core::{Guard, StateTree, Target};
pub use patch::{PatchError, UpdateOperation};
pub use signal::{combine, from_behavior, from_fn, map, ControlState, Emission, Signal};
