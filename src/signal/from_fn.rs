//! Signals backed by a generating function.

use crate::automaton::table::StateTable;
use crate::automaton::{ActionResult, Automaton, AutomatonConfig, Branch, Transition};
use crate::core::{StateTree, INIT_EVENT, ROOT_STATE};
use crate::signal::error::{PullPhase, SignalFault};
use crate::signal::{drive, model_update, Emission, Equality, Signal, PULL_EVENT};
use serde_json::{json, Value};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

const INIT: &str = "init";
const TEMP: &str = "temp";
const RUNNING: &str = "running";
const NEW: &str = "new";
const SAME: &str = "same";
const ERROR: &str = "error";
const DONE: &str = "done";

type Generator = Box<dyn FnMut() -> Result<Value, String>>;

/// Options for [`from_fn`].
#[derive(Clone, Default)]
pub struct FromFnSettings {
    equals: Option<Equality>,
    done: Option<Value>,
}

impl FromFnSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace structural equality when deciding between `NEW` and `SAME`.
    pub fn equals<F>(mut self, equals: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.equals = Some(Arc::new(equals));
        self
    }

    /// Value that, once generated, completes the signal.
    pub fn done(mut self, sentinel: Value) -> Self {
        self.done = Some(sentinel);
        self
    }
}

impl fmt::Debug for FromFnSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFnSettings")
            .field("equals", &self.equals.as_ref().map(|_| ".."))
            .field("done", &self.done)
            .finish()
    }
}

/// Settings handed to the automaton behind a [`FromFn`].
pub(crate) struct Context {
    generator: RefCell<Generator>,
    settings: FromFnSettings,
}

impl Context {
    fn generate(&self, phase: PullPhase) -> Result<Value, SignalFault> {
        let fault = |cause: String| SignalFault::Generator { phase, cause };
        let mut generator = self
            .generator
            .try_borrow_mut()
            .map_err(|_| fault("generating function called itself".to_string()))?;

        match panic::catch_unwind(AssertUnwindSafe(|| (*generator)())) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(cause)) => Err(fault(cause)),
            Err(payload) => Err(fault(panic_message(payload.as_ref()))),
        }
    }

    fn equals(&self, left: &Value, right: &Value) -> bool {
        match &self.settings.equals {
            Some(equals) => equals(left, right),
            None => left == right,
        }
    }

    fn is_done(&self, value: &Value) -> bool {
        self.settings.done.as_ref() == Some(value)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

/// A signal that calls its generator once per pull.
///
/// Created by [`from_fn`].
pub struct FromFn {
    automaton: Automaton<Context, (), Emission>,
    current: Emission,
}

/// Wrap a generating function into a signal.
///
/// Each pull calls `generator` once and classifies the result against the
/// last emitted value:
///
/// 1. `Err` or a panic: `ERROR`, with a message naming the failing pull;
/// 2. equal to the configured `done` sentinel: `DONE`, with no output;
/// 3. first value, or different from the last emitted one: `NEW`;
/// 4. otherwise `SAME`, replaying the last emitted value.
///
/// Once `ERROR` or `DONE` is reached the generator is never called again and
/// every pull repeats the same emission.
///
/// ```rust
/// use syncflow::signal::{from_fn, ControlState, FromFnSettings, Signal};
/// use serde_json::json;
///
/// let mut values = vec![json!(1), json!(1), json!("end")].into_iter();
/// let mut signal = from_fn(
///     move || values.next().ok_or("exhausted"),
///     FromFnSettings::new().done(json!("end")),
/// );
///
/// let states: Vec<ControlState> = (0..4)
///     .map(|_| {
///         signal.pull();
///         signal.get().control_state
///     })
///     .collect();
///
/// assert_eq!(
///     states,
///     vec![ControlState::New, ControlState::Same, ControlState::Done, ControlState::Done]
/// );
/// ```
pub fn from_fn<F, Err>(mut generator: F, settings: FromFnSettings) -> FromFn
where
    F: FnMut() -> Result<Value, Err> + 'static,
    Err: fmt::Display,
{
    let context = Context {
        generator: RefCell::new(Box::new(move || generator().map_err(|e| e.to_string()))),
        settings,
    };
    let (tree, transitions) = definition();
    let mut automaton = Automaton::new(
        StateTable::compile(&tree, transitions),
        initial_model(),
        context,
        AutomatonConfig::default().trace_capacity(0),
    );
    let current = drive(&mut automaton, None, &Emission::init());

    FromFn { automaton, current }
}

impl Signal for FromFn {
    fn pull(&mut self) {
        self.current = drive(&mut self.automaton, Some((PULL_EVENT, ())), &self.current);
    }

    fn get(&self) -> &Emission {
        &self.current
    }
}

fn initial_model() -> Value {
    json!({
        "cache": null,
        "value": null,
        "error": null,
        "primed": false,
    })
}

// `new` and `same` share the pull transition through their group.
fn definition() -> (StateTree, Vec<Transition<Context, (), Emission>>) {
    let tree = StateTree::new()
        .leaf(INIT)
        .leaf(TEMP)
        .group(RUNNING, StateTree::new().leaf(NEW).leaf(SAME))
        .leaf(ERROR)
        .leaf(DONE);

    let transitions = vec![
        transition(ROOT_STATE, Some(INIT_EVENT), vec![Branch::to(INIT).action(start)]),
        transition(INIT, Some(PULL_EVENT), vec![Branch::to(TEMP).action(first_pull)]),
        transition(RUNNING, Some(PULL_EVENT), vec![Branch::to(TEMP).action(subsequent_pull)]),
        transition(
            TEMP,
            None,
            vec![
                Branch::to(ERROR).when(has_error).action(emit_error),
                Branch::to(DONE).when(is_done).action(enter_done),
                Branch::to(NEW).when(is_new).action(enter_new),
                Branch::to(SAME).action(enter_same),
            ],
        ),
        transition(ERROR, Some(PULL_EVENT), vec![Branch::to(ERROR).action(emit_error)]),
        transition(DONE, Some(PULL_EVENT), vec![Branch::to(DONE).action(repeat_done)]),
    ];

    (tree, transitions)
}

fn transition(
    from: &str,
    event: Option<&str>,
    branches: Vec<Branch<Context, (), Emission>>,
) -> Transition<Context, (), Emission> {
    Transition {
        from: from.to_string(),
        event: event.map(str::to_string),
        branches,
    }
}

fn start(_: &Value, _: &(), _: &Context) -> ActionResult<Emission> {
    ActionResult::output(Emission::init())
}

fn first_pull(_: &Value, _: &(), context: &Context) -> ActionResult<Emission> {
    generate(context, PullPhase::First)
}

fn subsequent_pull(_: &Value, _: &(), context: &Context) -> ActionResult<Emission> {
    generate(context, PullPhase::Subsequent)
}

fn generate(context: &Context, phase: PullPhase) -> ActionResult<Emission> {
    let (value, error) = match context.generate(phase) {
        Ok(value) => (value, Value::Null),
        Err(fault) => (Value::Null, Value::String(fault.to_string())),
    };
    ActionResult::update(model_update(json!({ "value": value, "error": error })))
}

fn has_error(model: &Value, _: &(), _: &Context) -> bool {
    !model["error"].is_null()
}

fn is_done(model: &Value, _: &(), context: &Context) -> bool {
    context.is_done(&model["value"])
}

fn is_new(model: &Value, _: &(), context: &Context) -> bool {
    model["primed"] != json!(true) || !context.equals(&model["value"], &model["cache"])
}

fn emit_error(model: &Value, _: &(), _: &Context) -> ActionResult<Emission> {
    ActionResult::output(Emission::error(model["error"].as_str().unwrap_or_default()))
}

fn enter_done(_: &Value, _: &(), _: &Context) -> ActionResult<Emission> {
    ActionResult::update(model_update(json!({ "cache": null }))).with_output(Emission::done())
}

fn repeat_done(_: &Value, _: &(), _: &Context) -> ActionResult<Emission> {
    ActionResult::output(Emission::done())
}

fn enter_new(model: &Value, _: &(), _: &Context) -> ActionResult<Emission> {
    let value = model["value"].clone();
    ActionResult::update(model_update(json!({ "cache": value, "primed": true })))
        .with_output(Emission::new(value))
}

fn enter_same(model: &Value, _: &(), _: &Context) -> ActionResult<Emission> {
    ActionResult::output(Emission::same(model["cache"].clone()))
}
