//! Macros for ergonomic automaton construction.

/// Declare a [`StateTree`](crate::core::StateTree) with nested braces.
///
/// A bare name is a leaf; `Name => { ... }` is a grouping state.
///
/// # Example
///
/// ```
/// use syncflow::state_tree;
///
/// let tree = state_tree! {
///     Stopped,
///     Running => {
///         Playing,
///         Paused,
///     },
/// };
///
/// assert_eq!(tree.names(), vec!["Stopped", "Running", "Playing", "Paused"]);
/// ```
#[macro_export]
macro_rules! state_tree {
    (@acc $tree:expr ;) => {
        $tree
    };
    (@acc $tree:expr ; $name:ident => { $($children:tt)* } $(, $($rest:tt)*)?) => {
        $crate::state_tree!(
            @acc $tree.group(stringify!($name), $crate::state_tree!($($children)*)) ;
            $($($rest)*)?
        )
    };
    (@acc $tree:expr ; $name:ident $(, $($rest:tt)*)?) => {
        $crate::state_tree!(@acc $tree.leaf(stringify!($name)) ; $($($rest)*)?)
    };
    ($($body:tt)*) => {
        $crate::state_tree!(@acc $crate::core::StateTree::new() ; $($body)*)
    };
}
