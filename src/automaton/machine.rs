//! Synchronous interpreter for hierarchical automata.

use crate::automaton::config::AutomatonConfig;
use crate::automaton::table::{StateRecord, StateTable};
use crate::automaton::transition::AutomatonError;
use crate::core::{TransitionRecord, TransitionTrace, INIT_EVENT, ROOT_STATE};
use crate::patch;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, warn};

/// A running hierarchical automaton.
///
/// Owns the current state, the model and the settings. Every call runs to
/// completion: an event is resolved against the current state (or the
/// nearest ancestor handling it), the first branch whose guard passes fires,
/// and if the entered state is automatic the interpreter keeps going until it
/// rests in a state that is not.
///
/// Built with [`AutomatonBuilder`](crate::builder::AutomatonBuilder).
pub struct Automaton<S, E, O> {
    table: StateTable<S, E, O>,
    current: String,
    model: Value,
    settings: S,
    config: AutomatonConfig,
    trace: TransitionTrace,
    dropped_events: u64,
}

impl<S, E, O> Automaton<S, E, O> {
    pub(crate) fn new(
        table: StateTable<S, E, O>,
        model: Value,
        settings: S,
        config: AutomatonConfig,
    ) -> Self {
        let trace = TransitionTrace::new(config.trace_capacity);
        Self {
            table,
            current: ROOT_STATE.to_string(),
            model,
            settings,
            config,
            trace,
            dropped_events: 0,
        }
    }

    /// Send `init` from the synthetic root, with default event data.
    pub fn start(&mut self) -> Result<Option<O>, AutomatonError>
    where
        E: Default,
    {
        self.start_with(E::default())
    }

    /// Send `init` from the synthetic root, carrying `data`.
    ///
    /// Does nothing once the automaton has left the root.
    pub fn start_with(&mut self, data: E) -> Result<Option<O>, AutomatonError> {
        if self.current != ROOT_STATE {
            self.dropped_events += 1;
            warn!(state = %self.current, "automaton already started, ignoring start");
            return Ok(None);
        }
        self.yield_event(INIT_EVENT, data)
    }

    /// Process one external event.
    ///
    /// Returns the output of the last action executed, including actions
    /// fired while cascading through automatic states. `Ok(None)` means no
    /// output: either the action produced none, no handler exists for the
    /// event (counted in [`dropped_events`](Self::dropped_events)), or no
    /// guard passed.
    pub fn yield_event(&mut self, event: &str, data: E) -> Result<Option<O>, AutomatonError> {
        let mut event: &str = event;
        let mut depth = 0usize;

        loop {
            let Some((owner, branches)) = self.table.resolve(&self.current, event) else {
                if depth == 0 {
                    self.dropped_events += 1;
                    warn!(state = %self.current, event, "no transition for event, ignoring it");
                } else {
                    debug!(state = %self.current, event, depth, "automatic state has no handler");
                }
                return Ok(None);
            };

            let Some(branch) = branches
                .iter()
                .find(|b| b.can_fire(&self.model, &data, &self.settings))
            else {
                debug!(state = %self.current, handler = owner, event, "no guard satisfied");
                return Ok(None);
            };

            let target = branch.target.clone();
            let handler = owner.to_string();
            let result = branch.run(&self.model, &data, &self.settings);

            patch::apply(&mut self.model, &result.model_update).map_err(|source| {
                AutomatonError::ModelUpdate {
                    state: self.current.clone(),
                    event: event.to_string(),
                    source,
                }
            })?;

            let from = std::mem::take(&mut self.current);
            self.table.leave(&from);
            let entered = self.table.enter(&target);
            debug!(from = %from, event, to = %entered, handler = %handler, depth, "transition fired");

            if self.trace.capacity() > 0 {
                self.trace.record(TransitionRecord {
                    from,
                    event: event.to_string(),
                    to: entered.clone(),
                    timestamp: Utc::now(),
                    cascade_depth: depth,
                });
            }
            self.current = entered;

            let Some(next) = self.table.cascade_event(&self.current) else {
                return Ok(result.output);
            };

            depth += 1;
            if depth > self.config.max_cascade_depth {
                error!(
                    state = %self.current,
                    limit = self.config.max_cascade_depth,
                    "automatic transitions did not settle"
                );
                return Err(AutomatonError::CascadeLimitExceeded {
                    state: self.current.clone(),
                    limit: self.config.max_cascade_depth,
                });
            }
            event = next;
        }
    }

    /// Name of the state the automaton rests in.
    pub fn current_state(&self) -> &str {
        &self.current
    }

    pub fn is_started(&self) -> bool {
        self.current != ROOT_STATE
    }

    pub fn is_active(&self, state: &str) -> bool {
        self.table.state(state).is_some_and(|r| r.active)
    }

    /// Last leaf left inside `state`'s subtree, if any.
    pub fn last_seen(&self, state: &str) -> Option<&str> {
        self.table.state(state)?.last_seen.as_deref()
    }

    pub fn state(&self, name: &str) -> Option<&StateRecord> {
        self.table.state(name)
    }

    /// Every compiled state, synthetic root included, in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &StateRecord> {
        self.table.states()
    }

    /// Events ignored because no transition handled them.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    pub fn trace(&self) -> &TransitionTrace {
        &self.trace
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn model(&self) -> &Value {
        &self.model
    }
}
