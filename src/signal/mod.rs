//! Pull-based incremental dataflow.
//!
//! A [`Signal`] is advanced with [`pull`](Signal::pull) and read with
//! [`get`](Signal::get). Every pull classifies its outcome as a
//! [`ControlState`]: a changed value, an unchanged one, an error or
//! completion. Combinators use the classification to skip recomputation when
//! nothing upstream changed.
//!
//! Base signals ([`from_fn`], [`from_behavior`]) are each driven by a private
//! [`Automaton`](crate::automaton::Automaton). Their `ERROR` and `DONE` states
//! are sticky. The combinators ([`map`], [`combine`]) are not.
//!
//! # Example
//!
//! ```rust
//! use syncflow::signal::{combine, from_fn, ControlState, FromFnSettings, Signal};
//! use serde_json::{json, Value};
//!
//! let mut width = 0;
//! let widths = from_fn(move || { width += 100; Ok::<_, String>(json!(width)) }, FromFnSettings::new());
//! let height = from_fn(|| Ok::<_, String>(json!(50)), FromFnSettings::new());
//!
//! let mut area = combine(
//!     |sides: &[Value]| json!(sides[0].as_i64().unwrap_or(0) * sides[1].as_i64().unwrap_or(0)),
//!     vec![Box::new(widths), Box::new(height)],
//! );
//!
//! area.pull();
//! assert_eq!(area.get().control_state, ControlState::New);
//! assert_eq!(area.get().output, json!(5000));
//! ```

mod combine;
mod error;
mod from_behavior;
mod from_fn;
mod map;
mod subject;

pub use combine::{combine, Combine};
pub use error::{PullPhase, SignalFault};
pub use from_behavior::{
    from_behavior, Behavior, BehaviorSink, FromBehavior, FromBehaviorSettings, Subscription,
};
pub use from_fn::{from_fn, FromFn, FromFnSettings};
pub use map::{map, Map};
pub use subject::BehaviorSubject;

use crate::automaton::Automaton;
use crate::patch::{patch_from_fields, UpdateOperation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Event sent to a base signal's automaton on every pull.
pub(crate) const PULL_EVENT: &str = "pull";

/// Value comparison used to decide between `NEW` and `SAME`.
pub type Equality = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Outcome of the latest pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlState {
    /// Not pulled yet, or no value available yet
    Init,
    /// Output changed, or first value
    New,
    /// Cached output reused
    Same,
    Error,
    Done,
}

impl ControlState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::New => "new",
            Self::Same => "same",
            Self::Error => "error",
            Self::Done => "done",
        }
    }

    /// `ERROR` and `DONE` end a base signal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error | Self::Done)
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a signal computed on its latest pull.
///
/// `output` is `Value::Null` when there is nothing to show: before the first
/// value, after completion, or for an absent sample. For `ERROR` it holds the
/// error message as a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub control_state: ControlState,
    pub output: Value,
}

impl Emission {
    pub fn init() -> Self {
        Self {
            control_state: ControlState::Init,
            output: Value::Null,
        }
    }

    pub fn new(output: Value) -> Self {
        Self {
            control_state: ControlState::New,
            output,
        }
    }

    pub fn same(output: Value) -> Self {
        Self {
            control_state: ControlState::Same,
            output,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            control_state: ControlState::Error,
            output: Value::String(message.into()),
        }
    }

    pub fn done() -> Self {
        Self {
            control_state: ControlState::Done,
            output: Value::Null,
        }
    }

    /// The error message of an `ERROR` emission.
    pub fn error_message(&self) -> Option<String> {
        if self.control_state != ControlState::Error {
            return None;
        }
        Some(match &self.output {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        })
    }
}

impl Default for Emission {
    fn default() -> Self {
        Self::init()
    }
}

/// A value recomputed on demand.
pub trait Signal {
    /// Advance by one synchronous step.
    fn pull(&mut self);

    /// The result of the latest pull. Has no side effect.
    fn get(&self) -> &Emission;
}

impl<S: Signal + ?Sized> Signal for Box<S> {
    fn pull(&mut self) {
        (**self).pull()
    }

    fn get(&self) -> &Emission {
        (**self).get()
    }
}

/// Method-chaining forms of the combinators.
pub trait SignalExt: Signal + Sized {
    /// See [`map`](fn@map).
    fn map<F>(self, f: F) -> Map<Self, F>
    where
        F: FnMut(&Value) -> Value,
    {
        map(self, f)
    }

    fn boxed(self) -> Box<dyn Signal>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<S: Signal> SignalExt for S {}

/// Send one event to a base signal's automaton and turn the outcome into an
/// emission. `None` keeps `current`.
pub(crate) fn drive<S, E>(
    automaton: &mut Automaton<S, E, Emission>,
    event: Option<(&str, E)>,
    current: &Emission,
) -> Emission
where
    E: Default,
{
    let result = match event {
        Some((name, data)) => automaton.yield_event(name, data),
        None => automaton.start(),
    };
    match result {
        Ok(Some(emission)) => emission,
        Ok(None) => current.clone(),
        Err(source) => {
            error!(state = automaton.current_state(), error = %source, "signal automaton failed");
            Emission::error(SignalFault::Automaton(source.to_string()).to_string())
        }
    }
}

/// One `add` per field of `fields`, which is always an object literal here.
pub(crate) fn model_update(fields: Value) -> Vec<UpdateOperation> {
    patch_from_fields("", &fields).unwrap_or_default()
}
