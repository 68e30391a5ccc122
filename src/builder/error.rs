//! Build errors for automaton and transition builders.

use thiserror::Error;

/// Errors that can occur when building automata and transitions.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target not specified. Call .to(target) or add a .branch(..)")]
    MissingTarget,

    #[error("State tree is not a nested object of states")]
    InvalidStateTree,

    #[error("Automaton definition has {} problem(s): {}", .0.len(), join(.0))]
    InvalidDefinition(Vec<DefinitionError>),
}

/// One problem found while validating an automaton definition.
///
/// All problems in a definition are collected before the build fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Transition from '{from}' uses undeclared event '{event}'")]
    UnknownEvent { from: String, event: String },

    #[error("Transition from '{from}' uses reserved event '{event}'; omit the event for an automatic transition")]
    ReservedEvent { from: String, event: String },

    #[error("Transition source '{state}' is not a declared state")]
    UnknownSourceState { state: String },

    #[error("Transition from '{from}' targets undeclared state '{state}'")]
    UnknownTargetState { from: String, state: String },

    #[error("Transition from '{from}' targets the history of '{state}', which is not a group")]
    HistoryTargetNotGroup { from: String, state: String },

    #[error("State '{state}' is declared more than once")]
    DuplicateState { state: String },

    #[error("State name '{state}' is reserved")]
    ReservedStateName { state: String },

    #[error("Initial model must be a JSON object, found {found}")]
    InvalidInitialModel { found: &'static str },
}

fn join(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
