//! Builder for constructing automata.

use crate::automaton::table::StateTable;
use crate::automaton::{Automaton, AutomatonConfig, Transition};
use crate::builder::error::{BuildError, DefinitionError};
use crate::builder::transition::TransitionBuilder;
use crate::core::{StateTree, Target, AUTO_EVENT, INIT_EVENT, ROOT_STATE};
use crate::patch::operation::value_kind;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

type Check = Validation<(), NonEmptyVec<DefinitionError>>;

/// Builder for constructing automata with a fluent API.
///
/// # Example
///
/// ```rust
/// use syncflow::builder::{AutomatonBuilder, TransitionBuilder};
/// use syncflow::core::{INIT_EVENT, ROOT_STATE};
/// use syncflow::state_tree;
///
/// let mut automaton = AutomatonBuilder::<(), (), ()>::new()
///     .states(state_tree! { Off, On })
///     .events(["toggle"])
///     .transition(TransitionBuilder::new().from(ROOT_STATE).on(INIT_EVENT).to("Off"))?
///     .transition(TransitionBuilder::new().from("Off").on("toggle").to("On"))?
///     .transition(TransitionBuilder::new().from("On").on("toggle").to("Off"))?
///     .build(())?;
///
/// automaton.start()?;
/// automaton.yield_event("toggle", ())?;
/// assert_eq!(automaton.current_state(), "On");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AutomatonBuilder<S, E, O> {
    states: StateTree,
    events: Vec<String>,
    transitions: Vec<Transition<S, E, O>>,
    initial_model: Value,
    config: AutomatonConfig,
}

impl<S, E, O> AutomatonBuilder<S, E, O> {
    pub fn new() -> Self {
        Self {
            states: StateTree::new(),
            events: Vec::new(),
            transitions: Vec::new(),
            initial_model: Value::Object(Map::new()),
            config: AutomatonConfig::default(),
        }
    }

    /// Set the state hierarchy.
    pub fn states(mut self, tree: StateTree) -> Self {
        self.states = tree;
        self
    }

    /// Set the state hierarchy from its nested-object form.
    pub fn states_from_json(self, tree: &Value) -> Result<Self, BuildError> {
        let tree = StateTree::from_json(tree).ok_or(BuildError::InvalidStateTree)?;
        Ok(self.states(tree))
    }

    /// Declare the events transitions may be triggered by. `init` is always
    /// declared.
    pub fn events<I, T>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.events.extend(events.into_iter().map(Into::into));
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, E, O>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, E, O>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, E, O>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Set the model the automaton starts with. Must be a JSON object.
    pub fn initial_model(mut self, model: Value) -> Self {
        self.initial_model = model;
        self
    }

    pub fn config(mut self, config: AutomatonConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the definition and compile it into an automaton owning
    /// `settings`.
    ///
    /// Every problem in the definition is reported at once in
    /// [`BuildError::InvalidDefinition`].
    pub fn build(self, settings: S) -> Result<Automaton<S, E, O>, BuildError> {
        match self.validate() {
            Validation::Success(_) => {}
            Validation::Failure(errors) => {
                return Err(BuildError::InvalidDefinition(errors.iter().cloned().collect()))
            }
        }

        debug!(
            states = self.states.names().len(),
            transitions = self.transitions.len(),
            "automaton definition compiled"
        );
        let table = StateTable::compile(&self.states, self.transitions);
        Ok(Automaton::new(table, self.initial_model, settings, self.config))
    }

    fn validate(&self) -> Check {
        let mut checks: Vec<Check> = Vec::new();

        // name -> is_group
        let mut declared: HashMap<&str, bool> = HashMap::new();
        let mut reported: HashSet<&str> = HashSet::new();
        collect_states(&self.states, &mut |name, is_group| {
            let check = if name == ROOT_STATE {
                fail(DefinitionError::ReservedStateName {
                    state: name.to_string(),
                })
            } else if declared.insert(name, is_group).is_some() && reported.insert(name) {
                fail(DefinitionError::DuplicateState {
                    state: name.to_string(),
                })
            } else {
                Validation::success(())
            };
            checks.push(check);
        });

        if !self.initial_model.is_object() {
            checks.push(fail(DefinitionError::InvalidInitialModel {
                found: value_kind(&self.initial_model),
            }));
        }

        for transition in &self.transitions {
            checks.push(check_source(&transition.from, &declared));
            checks.push(self.check_event(transition));
            for branch in &transition.branches {
                checks.push(check_target(&transition.from, &branch.target, &declared));
            }
        }

        if checks.is_empty() {
            return Validation::success(());
        }
        Validation::all_vec(checks).map(|_| ())
    }

    fn check_event(&self, transition: &Transition<S, E, O>) -> Check {
        let Some(event) = transition.event.as_deref() else {
            return Validation::success(());
        };
        if event == AUTO_EVENT {
            fail(DefinitionError::ReservedEvent {
                from: transition.from.clone(),
                event: event.to_string(),
            })
        } else if event == INIT_EVENT || self.events.iter().any(|e| e == event) {
            Validation::success(())
        } else {
            fail(DefinitionError::UnknownEvent {
                from: transition.from.clone(),
                event: event.to_string(),
            })
        }
    }
}

impl<S, E, O> Default for AutomatonBuilder<S, E, O> {
    fn default() -> Self {
        Self::new()
    }
}

fn fail(error: DefinitionError) -> Check {
    Validation::fail(error)
}

fn check_source(from: &str, declared: &HashMap<&str, bool>) -> Check {
    if from == ROOT_STATE || declared.contains_key(from) {
        Validation::success(())
    } else {
        fail(DefinitionError::UnknownSourceState {
            state: from.to_string(),
        })
    }
}

fn check_target(from: &str, target: &Target, declared: &HashMap<&str, bool>) -> Check {
    let unknown = || {
        fail(DefinitionError::UnknownTargetState {
            from: from.to_string(),
            state: target.name().to_string(),
        })
    };
    match (target, declared.get(target.name())) {
        (_, None) => unknown(),
        (Target::History(group), Some(false)) => fail(DefinitionError::HistoryTargetNotGroup {
            from: from.to_string(),
            state: group.clone(),
        }),
        _ => Validation::success(()),
    }
}

fn collect_states<'a>(tree: &'a StateTree, visit: &mut impl FnMut(&'a str, bool)) {
    for node in tree.nodes() {
        visit(&node.name, node.is_group());
        if let Some(children) = &node.children {
            collect_states(children, visit);
        }
    }
}
