//! Guard predicates for selecting among same-triggered transitions.
//!
//! A guard sees the automaton model, the data carried by the event being
//! processed and the automaton settings. Guards should be pure: the
//! interpreter may evaluate several of them for one event and relies on
//! evaluation having no effect beyond the returned boolean.

use serde_json::Value;

/// Predicate deciding whether a transition branch fires.
///
/// # Example
///
/// ```rust
/// use syncflow::core::Guard;
/// use serde_json::json;
///
/// let positive = Guard::new(|model: &serde_json::Value, _data: &(), _settings: &()| {
///     model["count"].as_i64().is_some_and(|n| n > 0)
/// });
///
/// assert!(positive.check(&json!({"count": 2}), &(), &()));
/// assert!(!positive.check(&json!({"count": 0}), &(), &()));
/// ```
pub struct Guard<S, E> {
    predicate: Box<dyn Fn(&Value, &E, &S) -> bool + Send + Sync>,
}

impl<S, E> Guard<S, E> {
    /// Create a guard from a predicate over `(model, event_data, settings)`.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &E, &S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard.
    pub fn check(&self, model: &Value, event_data: &E, settings: &S) -> bool {
        (self.predicate)(model, event_data, settings)
    }
}

impl<S, E> std::fmt::Debug for Guard<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Limits {
        max: i64,
    }

    #[test]
    fn guard_reads_the_model() {
        let guard = Guard::new(|model: &Value, _: &(), _: &()| model["ready"] == json!(true));

        assert!(guard.check(&json!({"ready": true}), &(), &()));
        assert!(!guard.check(&json!({"ready": false}), &(), &()));
    }

    #[test]
    fn guard_reads_event_data() {
        let guard = Guard::new(|_: &Value, key: &String, _: &()| key == "enter");

        assert!(guard.check(&json!({}), &"enter".to_string(), &()));
        assert!(!guard.check(&json!({}), &"escape".to_string(), &()));
    }

    #[test]
    fn guard_reads_settings() {
        let guard = Guard::new(|model: &Value, _: &(), limits: &Limits| {
            model["n"].as_i64().is_some_and(|n| n < limits.max)
        });

        assert!(guard.check(&json!({"n": 1}), &(), &Limits { max: 2 }));
        assert!(!guard.check(&json!({"n": 3}), &(), &Limits { max: 2 }));
    }

    #[test]
    fn guard_is_deterministic() {
        let model = json!({"n": 4});
        let guard = Guard::new(|model: &Value, _: &(), _: &()| model["n"].as_i64() == Some(4));

        assert_eq!(guard.check(&model, &(), &()), guard.check(&model, &(), &()));
    }
}
