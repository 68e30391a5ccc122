//! Interpreter configuration.

use serde::{Deserialize, Serialize};

/// Run-time limits and diagnostics for an [`Automaton`](super::Automaton).
///
/// Missing fields take their default when deserialized, so a partial
/// configuration file is enough:
///
/// ```rust
/// use syncflow::automaton::AutomatonConfig;
///
/// let config: AutomatonConfig = serde_json::from_str(r#"{"max_cascade_depth": 32}"#).unwrap();
/// assert_eq!(config.max_cascade_depth, 32);
/// assert_eq!(config.trace_capacity, AutomatonConfig::default().trace_capacity);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    /// Automatic transitions allowed in a row before the interpreter gives
    /// up with `CascadeLimitExceeded`
    pub max_cascade_depth: usize,

    /// Executed transitions kept in the trace; zero disables tracing
    pub trace_capacity: usize,
}

impl AutomatonConfig {
    pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 10_000;
    pub const DEFAULT_TRACE_CAPACITY: usize = 64;

    pub fn max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    pub fn trace_capacity(mut self, capacity: usize) -> Self {
        self.trace_capacity = capacity;
        self
    }
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: Self::DEFAULT_MAX_CASCADE_DEPTH,
            trace_capacity: Self::DEFAULT_TRACE_CAPACITY,
        }
    }
}
