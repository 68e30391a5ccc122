//! State tree declarations and transition targets.
//!
//! A hierarchy is declared as a tree of names. A node with children is a
//! *grouping* state; a node without is a leaf. Names are global: no two nodes
//! may share one, whatever their depth, because transitions address states
//! by bare name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the synthetic root state every automaton starts in.
///
/// The root stands for "not yet started"; `start()` sends [`INIT_EVENT`]
/// from it.
pub const ROOT_STATE: &str = "<root>";

/// Event sent by `start()` and to initial grouping states on entry.
pub const INIT_EVENT: &str = "init";

/// Event synthesized for transitions declared without an event.
pub const AUTO_EVENT: &str = "auto";

/// One declared state and, for grouping states, its children.
#[derive(Clone, Debug, PartialEq)]
pub struct StateNode {
    pub name: String,
    pub children: Option<StateTree>,
}

impl StateNode {
    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }
}

/// Ordered declaration of a state hierarchy.
///
/// # Example
///
/// ```rust
/// use syncflow::core::StateTree;
///
/// let tree = StateTree::new()
///     .leaf("Idle")
///     .group("Playing", StateTree::new().leaf("Normal").leaf("FastForward"));
///
/// assert_eq!(tree.names(), vec!["Idle", "Playing", "Normal", "FastForward"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateTree {
    nodes: Vec<StateNode>,
}

impl StateTree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Declare a leaf state.
    pub fn leaf(mut self, name: impl Into<String>) -> Self {
        self.nodes.push(StateNode {
            name: name.into(),
            children: None,
        });
        self
    }

    /// Declare a grouping state holding `children`.
    pub fn group(mut self, name: impl Into<String>, children: StateTree) -> Self {
        self.nodes.push(StateNode {
            name: name.into(),
            children: Some(children),
        });
        self
    }

    /// Top-level nodes, in declaration order.
    pub fn nodes(&self) -> &[StateNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every declared name, depth-first, parents before children.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        for node in &self.nodes {
            out.push(node.name.as_str());
            if let Some(children) = &node.children {
                children.collect_names(out);
            }
        }
    }

    /// Read a tree from its nested-object form.
    ///
    /// Every member whose value is a non-empty object becomes a grouping
    /// state; any other value marks a leaf. Returns `None` if `value` is not an object.
    ///
    /// ```rust
    /// use syncflow::core::StateTree;
    /// use serde_json::json;
    ///
    /// let tree = StateTree::from_json(&json!({"A": "", "G": {"B": ""}})).unwrap();
    /// assert!(tree.nodes()[1].is_group());
    /// ```
    pub fn from_json(value: &Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };

        let mut tree = StateTree::new();
        for (name, config) in map {
            tree = match config {
                Value::Object(children) if !children.is_empty() => {
                    tree.group(name.clone(), Self::from_json(config)?)
                }
                _ => tree.leaf(name.clone()),
            };
        }
        Some(tree)
    }
}

/// Where a transition leads.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Enter the named state directly
    State(String),

    /// Re-enter the last active leaf of the named group, or the group
    /// itself if it was never left
    History(String),
}

impl Target {
    pub fn state(name: impl Into<String>) -> Self {
        Self::State(name.into())
    }

    pub fn history(group: impl Into<String>) -> Self {
        Self::History(group.into())
    }

    /// The state name this target refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::State(name) | Self::History(name) => name,
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::state(name)
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Self::State(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_are_listed_depth_first() {
        let tree = StateTree::new()
            .group(
                "A",
                StateTree::new().leaf("A1").group("A2", StateTree::new().leaf("A2a")),
            )
            .leaf("B");

        assert_eq!(tree.names(), vec!["A", "A1", "A2", "A2a", "B"]);
    }

    #[test]
    fn groups_and_leaves_are_distinguished() {
        let tree = StateTree::new().leaf("L").group("G", StateTree::new());

        assert!(!tree.nodes()[0].is_group());
        assert!(tree.nodes()[1].is_group());
    }

    #[test]
    fn from_json_builds_nested_groups() {
        let tree = StateTree::from_json(&json!({
            "Outer": {"Inner": {"Leaf": ""}},
            "Other": ""
        }))
        .unwrap();

        let mut names = tree.names();
        names.sort();
        assert_eq!(names, vec!["Inner", "Leaf", "Other", "Outer"]);
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(StateTree::from_json(&json!(["A", "B"])).is_none());
    }

    #[test]
    fn target_name_ignores_kind() {
        assert_eq!(Target::state("A").name(), "A");
        assert_eq!(Target::history("G").name(), "G");
        assert_eq!(Target::from("A"), Target::State("A".to_string()));
    }
}
