//! Signals backed by a push source.
//!
//! The source writes into a single-slot buffer whenever it changes; each pull
//! reads the slot. Only the latest outcome is kept between pulls.

use crate::automaton::table::StateTable;
use crate::automaton::{ActionResult, Automaton, AutomatonConfig, Branch, Transition};
use crate::core::{StateTree, INIT_EVENT, ROOT_STATE};
use crate::signal::error::SignalFault;
use crate::signal::{drive, model_update, Emission, Equality, Signal, PULL_EVENT};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const INIT: &str = "init";
const TEMP: &str = "temp";
const RUNNING: &str = "running";
const NEW: &str = "new";
const SAME: &str = "same";
const ERROR: &str = "error";
const DONE: &str = "done";

/// A push source that can be observed.
///
/// Implementations call the sink at most once per underlying change, from
/// any thread.
pub trait Behavior {
    /// Start delivering changes to `sink` until the returned subscription is
    /// dropped.
    fn subscribe(&self, sink: BehaviorSink) -> Subscription;
}

/// Latest outcome pushed by a source and not yet replaced.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum Slot {
    #[default]
    Empty,
    Value {
        value: Value,
        fresh: bool,
    },
    Error(String),
    Completed,
}

impl Slot {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Completed)
    }
}

/// Write end of a [`FromBehavior`] buffer, handed to [`Behavior::subscribe`].
///
/// The last write before a pull wins. Once an error or completion is written
/// the sink ignores everything else.
#[derive(Clone, Debug)]
pub struct BehaviorSink {
    slot: Arc<Mutex<Slot>>,
}

impl BehaviorSink {
    fn write(&self, next: Slot) {
        let mut slot = self.slot.lock();
        if !slot.is_terminal() {
            *slot = next;
        }
    }

    pub fn next(&self, value: Value) {
        self.write(Slot::Value { value, fresh: true });
    }

    pub fn error(&self, cause: impl fmt::Display) {
        self.write(Slot::Error(cause.to_string()));
    }

    pub fn complete(&self) {
        self.write(Slot::Completed);
    }

    /// True once an error or completion has been written.
    pub fn is_closed(&self) -> bool {
        self.slot.lock().is_terminal()
    }
}

/// Handle on a subscription; releases it when dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { release: None }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Options for [`from_behavior`].
#[derive(Clone, Default)]
pub struct FromBehaviorSettings {
    equals: Option<Equality>,
}

impl FromBehaviorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a pushed value equal to the last emitted one as `SAME`.
    /// Without it every push is `NEW`.
    pub fn equals<F>(mut self, equals: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.equals = Some(Arc::new(equals));
        self
    }
}

/// A signal reading the latest push of a [`Behavior`].
///
/// Created by [`from_behavior`].
pub struct FromBehavior {
    automaton: Automaton<FromBehaviorSettings, Slot, Emission>,
    slot: Arc<Mutex<Slot>>,
    current: Emission,
    _subscription: Subscription,
}

/// Subscribe once to `source` and expose it as a signal.
///
/// A pull classifies the buffered outcome: a value pushed since the last
/// pull is `NEW`, an already pulled value is `SAME`, an error is a sticky
/// `ERROR` and completion a sticky `DONE`. Pulling before anything was pushed
/// yields `INIT`. Dropping the signal releases the subscription.
///
/// ```rust
/// use syncflow::signal::{from_behavior, BehaviorSubject, ControlState, FromBehaviorSettings, Signal};
/// use serde_json::json;
///
/// let user_name = BehaviorSubject::new();
/// let mut signal = from_behavior(&user_name, FromBehaviorSettings::new());
///
/// user_name.next(json!("ada"));
/// signal.pull();
/// assert_eq!(signal.get().control_state, ControlState::New);
///
/// signal.pull();
/// assert_eq!(signal.get().control_state, ControlState::Same);
/// assert_eq!(signal.get().output, json!("ada"));
/// ```
pub fn from_behavior<B>(source: &B, settings: FromBehaviorSettings) -> FromBehavior
where
    B: Behavior + ?Sized,
{
    let slot = Arc::new(Mutex::new(Slot::Empty));
    let subscription = source.subscribe(BehaviorSink {
        slot: Arc::clone(&slot),
    });
    debug!("behavior subscribed");

    let (tree, transitions) = definition();
    let mut automaton = Automaton::new(
        StateTable::compile(&tree, transitions),
        initial_model(),
        settings,
        AutomatonConfig::default().trace_capacity(0),
    );
    let current = drive(&mut automaton, None, &Emission::init());

    FromBehavior {
        automaton,
        slot,
        current,
        _subscription: subscription,
    }
}

impl FromBehavior {
    fn take_snapshot(&self) -> Slot {
        let mut slot = self.slot.lock();
        let snapshot = slot.clone();
        if let Slot::Value { fresh, .. } = &mut *slot {
            *fresh = false;
        }
        snapshot
    }
}

impl Signal for FromBehavior {
    fn pull(&mut self) {
        let snapshot = self.take_snapshot();
        self.current = drive(&mut self.automaton, Some((PULL_EVENT, snapshot)), &self.current);
    }

    fn get(&self) -> &Emission {
        &self.current
    }
}

fn initial_model() -> Value {
    json!({ "cache": null, "error": null, "primed": false })
}

fn definition() -> (
    StateTree,
    Vec<Transition<FromBehaviorSettings, Slot, Emission>>,
) {
    let tree = StateTree::new()
        .leaf(INIT)
        .leaf(TEMP)
        .group(RUNNING, StateTree::new().leaf(NEW).leaf(SAME))
        .leaf(ERROR)
        .leaf(DONE);

    let transitions = vec![
        transition(ROOT_STATE, Some(INIT_EVENT), vec![Branch::to(INIT).action(emit_init)]),
        transition(INIT, Some(PULL_EVENT), vec![Branch::to(TEMP)]),
        transition(RUNNING, Some(PULL_EVENT), vec![Branch::to(TEMP)]),
        transition(
            TEMP,
            None,
            vec![
                Branch::to(ERROR).when(is_error).action(enter_error),
                Branch::to(DONE).when(is_completed).action(emit_done),
                Branch::to(NEW).when(is_new).action(enter_new),
                Branch::to(SAME).when(has_value).action(emit_same),
                Branch::to(INIT).action(emit_init),
            ],
        ),
        transition(ERROR, Some(PULL_EVENT), vec![Branch::to(ERROR).action(repeat_error)]),
        transition(DONE, Some(PULL_EVENT), vec![Branch::to(DONE).action(emit_done)]),
    ];

    (tree, transitions)
}

fn transition(
    from: &str,
    event: Option<&str>,
    branches: Vec<Branch<FromBehaviorSettings, Slot, Emission>>,
) -> Transition<FromBehaviorSettings, Slot, Emission> {
    Transition {
        from: from.to_string(),
        event: event.map(str::to_string),
        branches,
    }
}

fn is_error(_: &Value, slot: &Slot, _: &FromBehaviorSettings) -> bool {
    matches!(slot, Slot::Error(_))
}

fn is_completed(_: &Value, slot: &Slot, _: &FromBehaviorSettings) -> bool {
    matches!(slot, Slot::Completed)
}

fn is_new(model: &Value, slot: &Slot, settings: &FromBehaviorSettings) -> bool {
    let Slot::Value { value, fresh: true } = slot else {
        return false;
    };
    match &settings.equals {
        Some(equals) if model["primed"] == json!(true) => !equals(value, &model["cache"]),
        _ => true,
    }
}

fn has_value(_: &Value, slot: &Slot, _: &FromBehaviorSettings) -> bool {
    matches!(slot, Slot::Value { .. })
}

fn emit_init(_: &Value, _: &Slot, _: &FromBehaviorSettings) -> ActionResult<Emission> {
    ActionResult::output(Emission::init())
}

fn enter_error(_: &Value, slot: &Slot, _: &FromBehaviorSettings) -> ActionResult<Emission> {
    let cause = match slot {
        Slot::Error(cause) => cause.clone(),
        _ => String::new(),
    };
    let message = SignalFault::Behavior { cause }.to_string();
    ActionResult::update(model_update(json!({ "error": message })))
        .with_output(Emission::error(message))
}

fn repeat_error(model: &Value, _: &Slot, _: &FromBehaviorSettings) -> ActionResult<Emission> {
    ActionResult::output(Emission::error(model["error"].as_str().unwrap_or_default()))
}

fn emit_done(_: &Value, _: &Slot, _: &FromBehaviorSettings) -> ActionResult<Emission> {
    ActionResult::output(Emission::done())
}

fn enter_new(_: &Value, slot: &Slot, _: &FromBehaviorSettings) -> ActionResult<Emission> {
    let value = match slot {
        Slot::Value { value, .. } => value.clone(),
        _ => Value::Null,
    };
    ActionResult::update(model_update(json!({ "cache": value, "primed": true })))
        .with_output(Emission::new(value))
}

fn emit_same(model: &Value, _: &Slot, _: &FromBehaviorSettings) -> ActionResult<Emission> {
    ActionResult::output(Emission::same(model["cache"].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AutomatonBuilder;
    use crate::signal::{BehaviorSubject, ControlState};
    use std::thread;

    #[test]
    fn definition_passes_validation() {
        let (tree, transitions) = definition();

        let built = AutomatonBuilder::new()
            .states(tree)
            .events([PULL_EVENT])
            .transitions(transitions)
            .initial_model(initial_model())
            .build(FromBehaviorSettings::new());

        assert!(built.is_ok());
    }

    #[test]
    fn pull_before_any_push_is_init() {
        let subject = BehaviorSubject::new();
        let mut signal = from_behavior(&subject, FromBehaviorSettings::new());

        signal.pull();

        assert_eq!(signal.get(), &Emission::init());
    }

    #[test]
    fn pushed_values_are_new_once_then_same() {
        let subject = BehaviorSubject::new();
        let mut signal = from_behavior(&subject, FromBehaviorSettings::new());

        subject.next(json!(1));
        signal.pull();
        assert_eq!(signal.get(), &Emission::new(json!(1)));

        signal.pull();
        assert_eq!(signal.get(), &Emission::same(json!(1)));
    }

    #[test]
    fn last_push_before_a_pull_wins() {
        let subject = BehaviorSubject::new();
        let mut signal = from_behavior(&subject, FromBehaviorSettings::new());

        subject.next(json!(2));
        subject.next(json!(3));
        signal.pull();

        assert_eq!(signal.get(), &Emission::new(json!(3)));
    }

    #[test]
    fn repeated_equal_push_is_new_by_default() {
        let subject = BehaviorSubject::with_value(json!("a"));
        let mut signal = from_behavior(&subject, FromBehaviorSettings::new());
        signal.pull();

        subject.next(json!("a"));
        signal.pull();

        assert_eq!(signal.get().control_state, ControlState::New);
    }

    #[test]
    fn equality_setting_turns_equal_pushes_into_same() {
        let subject = BehaviorSubject::with_value(json!("a"));
        let mut signal =
            from_behavior(&subject, FromBehaviorSettings::new().equals(|a, b| a == b));
        signal.pull();

        subject.next(json!("a"));
        signal.pull();

        assert_eq!(signal.get(), &Emission::same(json!("a")));
    }

    #[test]
    fn source_error_is_sticky() {
        let subject = BehaviorSubject::new();
        let mut signal = from_behavior(&subject, FromBehaviorSettings::new());
        subject.next(json!(1));
        signal.pull();

        subject.error("connection lost");
        signal.pull();
        signal.pull();

        assert_eq!(
            signal.get(),
            &Emission::error("behavior > error emitted by the source behavior: connection lost")
        );
    }

    #[test]
    fn completion_is_sticky() {
        let subject = BehaviorSubject::new();
        let mut signal = from_behavior(&subject, FromBehaviorSettings::new());

        subject.complete();
        signal.pull();
        subject.next(json!(5));
        signal.pull();

        assert_eq!(signal.get(), &Emission::done());
    }

    #[test]
    fn dropping_the_signal_releases_the_subscription() {
        let subject = BehaviorSubject::new();
        let signal = from_behavior(&subject, FromBehaviorSettings::new());
        assert_eq!(subject.subscriber_count(), 1);

        drop(signal);

        assert_eq!(subject.subscriber_count(), 0);
    }

    #[test]
    fn sink_accepts_writes_from_another_thread() {
        let slot = Arc::new(Mutex::new(Slot::Empty));
        let sink = BehaviorSink {
            slot: Arc::clone(&slot),
        };

        let writer = thread::spawn(move || sink.next(json!("from thread")));
        writer.join().unwrap();

        assert_eq!(
            *slot.lock(),
            Slot::Value {
                value: json!("from thread"),
                fresh: true
            }
        );
    }

    #[test]
    fn sink_ignores_writes_after_completion() {
        let sink = BehaviorSink {
            slot: Arc::new(Mutex::new(Slot::Empty)),
        };

        sink.complete();
        sink.next(json!(1));

        assert!(sink.is_closed());
        assert_eq!(*sink.slot.lock(), Slot::Completed);
    }
}
