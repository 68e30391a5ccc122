//! An in-process push source.

use crate::signal::from_behavior::{Behavior, BehaviorSink, Subscription};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Terminal {
    Error(String),
    Completed,
}

#[derive(Default)]
struct SubjectState {
    current: Option<Value>,
    terminal: Option<Terminal>,
    sinks: Vec<(u64, BehaviorSink)>,
    next_id: u64,
}

/// A [`Behavior`] holding a current value that is replayed to every new
/// subscriber.
///
/// Clones share the same state, so one clone can be handed to a producer
/// thread while another is subscribed to.
#[derive(Clone, Default)]
pub struct BehaviorSubject {
    inner: Arc<Mutex<SubjectState>>,
}

impl BehaviorSubject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: Value) -> Self {
        let subject = Self::new();
        subject.inner.lock().current = Some(value);
        subject
    }

    /// Replace the current value and push it to every subscriber.
    /// Ignored after `error` or `complete`.
    pub fn next(&self, value: Value) {
        let mut state = self.inner.lock();
        if state.terminal.is_some() {
            return;
        }
        for (_, sink) in &state.sinks {
            sink.next(value.clone());
        }
        state.current = Some(value);
    }

    pub fn error(&self, cause: impl fmt::Display) {
        self.terminate(Terminal::Error(cause.to_string()));
    }

    pub fn complete(&self) {
        self.terminate(Terminal::Completed);
    }

    /// The value new subscribers receive first.
    pub fn value(&self) -> Option<Value> {
        self.inner.lock().current.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().sinks.len()
    }

    fn terminate(&self, terminal: Terminal) {
        let mut state = self.inner.lock();
        if state.terminal.is_some() {
            return;
        }
        for (_, sink) in state.sinks.drain(..) {
            deliver(&sink, &terminal);
        }
        state.terminal = Some(terminal);
    }
}

fn deliver(sink: &BehaviorSink, terminal: &Terminal) {
    match terminal {
        Terminal::Error(cause) => sink.error(cause),
        Terminal::Completed => sink.complete(),
    }
}

impl Behavior for BehaviorSubject {
    fn subscribe(&self, sink: BehaviorSink) -> Subscription {
        let mut state = self.inner.lock();
        if let Some(terminal) = &state.terminal {
            deliver(&sink, terminal);
            return Subscription::empty();
        }
        if let Some(value) = &state.current {
            sink.next(value.clone());
        }

        let id = state.next_id;
        state.next_id += 1;
        state.sinks.push((id, sink));

        let inner = Arc::clone(&self.inner);
        Subscription::new(move || inner.lock().sinks.retain(|(sink_id, _)| *sink_id != id))
    }
}

impl fmt::Debug for BehaviorSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("BehaviorSubject")
            .field("current", &state.current)
            .field("terminal", &state.terminal)
            .field("subscribers", &state.sinks.len())
            .finish()
    }
}
