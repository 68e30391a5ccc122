//! Flattened state table compiled from a state tree and a transition list.
//!
//! A child state inherits every transition of its ancestors unless it
//! declares its own handler for the same event. Resolution walks the parent
//! links until a handler is found.

use crate::automaton::transition::{Branch, Transition};
use crate::core::{StateTree, Target, AUTO_EVENT, INIT_EVENT, ROOT_STATE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Compiled description of one state plus its run-time history slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub name: String,
    /// `None` only for the synthetic root
    pub parent: Option<String>,
    pub is_group: bool,
    /// Has at least one eventless transition, or is a group with an `init`
    /// transition. Entering such a state cascades immediately.
    pub is_automatic: bool,
    /// Has an `init` transition
    pub is_initial: bool,
    /// Last leaf left inside this state's subtree
    pub last_seen: Option<String>,
    pub active: bool,
}

impl StateRecord {
    fn new(name: &str, parent: Option<&str>, is_group: bool) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            is_group,
            is_automatic: false,
            is_initial: false,
            last_seen: None,
            active: false,
        }
    }
}

type Handlers<S, E, O> = HashMap<String, Vec<Branch<S, E, O>>>;

pub(crate) struct StateTable<S, E, O> {
    states: HashMap<String, StateRecord>,
    handlers: HashMap<String, Handlers<S, E, O>>,
}

impl<S, E, O> StateTable<S, E, O> {
    /// Flatten `tree` under the synthetic root and register `transitions`.
    ///
    /// Expects a definition that already passed validation: every name
    /// referenced by a transition is declared.
    pub(crate) fn compile(tree: &StateTree, transitions: Vec<Transition<S, E, O>>) -> Self {
        let mut states = HashMap::new();
        let mut root = StateRecord::new(ROOT_STATE, None, true);
        root.active = true;
        states.insert(ROOT_STATE.to_string(), root);
        flatten(tree, ROOT_STATE, &mut states);

        let mut handlers: HashMap<String, Handlers<S, E, O>> = HashMap::new();
        for transition in transitions {
            if let Some(record) = states.get_mut(&transition.from) {
                if transition.is_automatic() {
                    record.is_automatic = true;
                }
                if transition.event.as_deref() == Some(INIT_EVENT) {
                    record.is_initial = true;
                }
            }

            let event = transition.event_name().to_string();
            handlers
                .entry(transition.from)
                .or_default()
                .entry(event)
                .or_default()
                .extend(transition.branches);
        }

        // A group entered with an init transition must cascade down to a leaf.
        for record in states.values_mut() {
            if record.is_group && record.is_initial && record.name != ROOT_STATE {
                record.is_automatic = true;
            }
        }

        Self { states, handlers }
    }

    pub(crate) fn state(&self, name: &str) -> Option<&StateRecord> {
        self.states.get(name)
    }

    pub(crate) fn states(&self) -> impl Iterator<Item = &StateRecord> {
        self.states.values()
    }

    /// Strict ancestors of `name`, nearest first. The synthetic root is
    /// included.
    pub(crate) fn ancestors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a StateRecord> {
        let mut next = self.states.get(name).and_then(|r| r.parent.as_deref());
        std::iter::from_fn(move || {
            let record = self.states.get(next?)?;
            next = record.parent.as_deref();
            Some(record)
        })
    }

    /// Find the handler for `event` in `state` or its nearest ancestor that
    /// declares one.
    ///
    /// The root's own handlers (the `init` transition taken by `start`) are
    /// only visible while the automaton is still in the root.
    pub(crate) fn resolve(&self, state: &str, event: &str) -> Option<(&str, &[Branch<S, E, O>])> {
        let lookup = |name: &str| {
            self.handlers
                .get(name)
                .and_then(|by_event| by_event.get(event))
                .map(|branches| branches.as_slice())
        };

        if let Some(branches) = lookup(state) {
            return self.states.get(state).map(|r| (r.name.as_str(), branches));
        }
        self.ancestors(state)
            .filter(|record| record.name != ROOT_STATE)
            .find_map(|record| lookup(&record.name).map(|b| (record.name.as_str(), b)))
    }

    /// Record `name` as the last seen state of itself and every ancestor.
    pub(crate) fn leave(&mut self, name: &str) {
        let mut cursor = Some(name.to_string());
        while let Some(current) = cursor {
            let Some(record) = self.states.get_mut(&current) else {
                break;
            };
            record.last_seen = Some(name.to_string());
            if current == name {
                record.active = false;
            }
            cursor = record.parent.clone();
        }
    }

    /// Resolve `target` to a concrete state, mark it active and return its
    /// name.
    pub(crate) fn enter(&mut self, target: &Target) -> String {
        let name = match target {
            Target::State(name) => name.clone(),
            Target::History(group) => self
                .states
                .get(group)
                .and_then(|record| record.last_seen.clone())
                .unwrap_or_else(|| group.clone()),
        };
        if let Some(record) = self.states.get_mut(&name) {
            record.active = true;
        }
        name
    }

    /// The event to send when cascading out of `name`, if it is automatic.
    pub(crate) fn cascade_event(&self, name: &str) -> Option<&'static str> {
        let record = self.states.get(name)?;
        match (record.is_automatic, record.is_initial) {
            (true, true) => Some(INIT_EVENT),
            (true, false) => Some(AUTO_EVENT),
            _ => None,
        }
    }
}

fn flatten(tree: &StateTree, parent: &str, states: &mut HashMap<String, StateRecord>) {
    for node in tree.nodes() {
        states.insert(
            node.name.clone(),
            StateRecord::new(&node.name, Some(parent), node.is_group()),
        );
        if let Some(children) = &node.children {
            flatten(children, &node.name, states);
        }
    }
}
