//! Faults captured by signals and reported as `ERROR` emissions.

use std::fmt;
use thiserror::Error;

/// Which pull of a generator-backed signal failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullPhase {
    First,
    Subsequent,
}

impl fmt::Display for PullPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first pull"),
            Self::Subsequent => f.write_str("subsequent pull"),
        }
    }
}

/// A failure inside a signal.
///
/// Signals never return these to the caller of `pull()`; the rendered
/// message becomes the output of an `ERROR` emission.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignalFault {
    #[error("{phase} > error while executing generating function: {cause}")]
    Generator { phase: PullPhase, cause: String },

    #[error("behavior > error emitted by the source behavior: {cause}")]
    Behavior { cause: String },

    #[error("signal automaton failed: {0}")]
    Automaton(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_fault_names_the_phase() {
        let fault = SignalFault::Generator {
            phase: PullPhase::Subsequent,
            cause: "boom".to_string(),
        };

        assert_eq!(
            fault.to_string(),
            "subsequent pull > error while executing generating function: boom"
        );
    }

    #[test]
    fn behavior_fault_is_prefixed() {
        let fault = SignalFault::Behavior {
            cause: "socket closed".to_string(),
        };

        assert_eq!(
            fault.to_string(),
            "behavior > error emitted by the source behavior: socket closed"
        );
    }
}
