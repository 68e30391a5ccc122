//! Combine several signals into one.

use crate::signal::{ControlState, Emission, Signal};
use serde_json::Value;

/// Signal returned by [`combine`].
pub struct Combine<F> {
    inputs: Vec<Box<dyn Signal>>,
    f: F,
    current: Emission,
    cached: Value,
}

/// Combine `inputs` with `f`, recomputing only when an input changed.
///
/// Every pull pulls all inputs, then the first matching rule decides:
///
/// 1. any input `ERROR`: `ERROR`, with the input messages joined by newlines
///    in input order;
/// 2. any input `DONE`: `DONE`;
/// 3. any input without a value (`null` output, or still `INIT`): `NEW`
///    with a `null` output;
/// 4. all inputs `SAME`: `SAME`, replaying the last value produced by
///    rules 3 or 5 without calling `f`;
/// 5. otherwise `NEW` with `f` applied to the input outputs, in input order.
pub fn combine<F>(f: F, inputs: Vec<Box<dyn Signal>>) -> Combine<F>
where
    F: FnMut(&[Value]) -> Value,
{
    Combine {
        inputs,
        f,
        current: Emission::init(),
        cached: Value::Null,
    }
}

impl<F> Combine<F> {
    pub fn inputs(&self) -> &[Box<dyn Signal>] {
        &self.inputs
    }
}

impl<F> Signal for Combine<F>
where
    F: FnMut(&[Value]) -> Value,
{
    fn pull(&mut self) {
        for input in &mut self.inputs {
            input.pull();
        }
        let emissions: Vec<&Emission> = self.inputs.iter().map(|input| input.get()).collect();

        let errors: Vec<String> = emissions.iter().filter_map(|e| e.error_message()).collect();
        if !errors.is_empty() {
            self.current = Emission::error(errors.join("\n"));
            return;
        }

        if emissions.iter().any(|e| e.control_state == ControlState::Done) {
            self.current = Emission::done();
            return;
        }

        if emissions.iter().any(|e| is_absent(e)) {
            self.cached = Value::Null;
            self.current = Emission::new(Value::Null);
            return;
        }

        if emissions.iter().all(|e| e.control_state == ControlState::Same) {
            self.current = Emission::same(self.cached.clone());
            return;
        }

        let outputs: Vec<Value> = emissions.iter().map(|e| e.output.clone()).collect();
        self.cached = (self.f)(&outputs);
        self.current = Emission::new(self.cached.clone());
    }

    fn get(&self) -> &Emission {
        &self.current
    }
}

fn is_absent(emission: &Emission) -> bool {
    match emission.control_state {
        ControlState::Init => true,
        ControlState::New | ControlState::Same => emission.output.is_null(),
        ControlState::Error | ControlState::Done => false,
    }
}
