//! Transform a signal's output.

use crate::signal::{ControlState, Emission, Signal};
use serde_json::Value;

/// Signal returned by [`map`].
pub struct Map<S, F> {
    source: S,
    f: F,
    current: Emission,
    last_mapped: Value,
}

/// Apply `f` to every `NEW` output of `source`.
///
/// `SAME` replays the last mapped output without calling `f`. `ERROR`,
/// `DONE` and `INIT` pass through unchanged and are not sticky here: if the
/// source later produces values again, `map` follows it.
///
/// ```rust
/// use syncflow::signal::{from_fn, map, Emission, FromFnSettings, Signal};
/// use serde_json::{json, Value};
///
/// let mut values = vec![json!(2), json!(2)].into_iter();
/// let source = from_fn(move || values.next().ok_or("exhausted"), FromFnSettings::new());
/// let mut doubled = map(source, |v: &Value| json!(v.as_i64().unwrap_or(0) * 2));
///
/// doubled.pull();
/// assert_eq!(doubled.get(), &Emission::new(json!(4)));
/// doubled.pull();
/// assert_eq!(doubled.get(), &Emission::same(json!(4)));
/// ```
pub fn map<S, F>(source: S, f: F) -> Map<S, F>
where
    S: Signal,
    F: FnMut(&Value) -> Value,
{
    Map {
        source,
        f,
        current: Emission::init(),
        last_mapped: Value::Null,
    }
}

impl<S, F> Map<S, F> {
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, F> Signal for Map<S, F>
where
    S: Signal,
    F: FnMut(&Value) -> Value,
{
    fn pull(&mut self) {
        self.source.pull();
        let upstream = self.source.get();

        self.current = match upstream.control_state {
            ControlState::New => {
                self.last_mapped = (self.f)(&upstream.output);
                Emission::new(self.last_mapped.clone())
            }
            ControlState::Same => Emission::same(self.last_mapped.clone()),
            ControlState::Init | ControlState::Error | ControlState::Done => upstream.clone(),
        };
    }

    fn get(&self) -> &Emission {
        &self.current
    }
}
