//! Model patching.
//!
//! Automaton actions never mutate the model directly. They return a list of
//! [`UpdateOperation`]s which the interpreter hands to [`apply`]. Paths are
//! slash-delimited from the model root (`/user/name`), with `~1` and `~0`
//! standing for a literal `/` and `~` inside a segment.
//!
//! # Example
//!
//! ```rust
//! use syncflow::patch::{apply, UpdateOperation};
//! use serde_json::json;
//!
//! let mut model = json!({"count": 0, "tags": []});
//! apply(&mut model, &[
//!     UpdateOperation::replace("/count", json!(1)),
//!     UpdateOperation::add("/tags/-", json!("seen")),
//! ]).unwrap();
//!
//! assert_eq!(model, json!({"count": 1, "tags": ["seen"]}));
//! ```

pub mod error;
pub mod operation;

pub use error::PatchError;
pub use operation::{patch_from_fields, UpdateOperation};

use serde_json::Value;

/// Apply `ops` to `model`, in order.
///
/// Every path is checked before anything is touched, and the operations run
/// against a working copy that replaces `model` only once all of them have
/// succeeded. On error the model is unchanged.
pub fn apply(model: &mut Value, ops: &[UpdateOperation]) -> Result<(), PatchError> {
    if ops.is_empty() {
        return Ok(());
    }

    let parsed = ops
        .iter()
        .map(|op| parse_path(op.path()).map(|tokens| (op, tokens)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut working = model.clone();
    for (op, tokens) in parsed {
        apply_one(&mut working, op, &tokens)?;
    }

    *model = working;
    Ok(())
}

fn apply_one(doc: &mut Value, op: &UpdateOperation, tokens: &[String]) -> Result<(), PatchError> {
    match op {
        UpdateOperation::Add { path, value } => {
            let Some((last, parent_tokens)) = tokens.split_last() else {
                *doc = value.clone();
                return Ok(());
            };
            let parent = resolve_mut(doc, parent_tokens)
                .ok_or_else(|| PatchError::MissingParent { path: path.clone() })?;

            match parent {
                Value::Object(map) => {
                    map.insert(last.clone(), value.clone());
                    Ok(())
                }
                Value::Array(items) => {
                    if last == "-" {
                        items.push(value.clone());
                        return Ok(());
                    }
                    match parse_index(last) {
                        Some(index) if index <= items.len() => {
                            items.insert(index, value.clone());
                            Ok(())
                        }
                        _ => Err(PatchError::InvalidIndex {
                            path: path.clone(),
                            index: last.clone(),
                        }),
                    }
                }
                _ => Err(PatchError::NotAContainer { path: path.clone() }),
            }
        }
        UpdateOperation::Replace { path, value } => {
            let target = resolve_mut(doc, tokens).ok_or_else(|| PatchError::MissingTarget {
                op: "replace",
                path: path.clone(),
            })?;
            *target = value.clone();
            Ok(())
        }
        UpdateOperation::Remove { path } => {
            let Some((last, parent_tokens)) = tokens.split_last() else {
                return Err(PatchError::InvalidPath {
                    path: path.clone(),
                    reason: "the model root cannot be removed".to_string(),
                });
            };
            let missing = || PatchError::MissingTarget {
                op: "remove",
                path: path.clone(),
            };
            let parent = resolve_mut(doc, parent_tokens).ok_or_else(missing)?;

            match parent {
                Value::Object(map) => map.remove(last).map(|_| ()).ok_or_else(missing),
                Value::Array(items) => match parse_index(last) {
                    Some(index) if index < items.len() => {
                        items.remove(index);
                        Ok(())
                    }
                    _ => Err(missing()),
                },
                _ => Err(missing()),
            }
        }
    }
}

fn resolve_mut<'a>(doc: &'a mut Value, tokens: &[String]) -> Option<&'a mut Value> {
    let mut current = doc;
    for token in tokens {
        current = match current {
            Value::Object(map) => map.get_mut(token)?,
            Value::Array(items) => items.get_mut(parse_index(token)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Split a path into unescaped segments. The empty path is the root.
pub(crate) fn parse_path(path: &str) -> Result<Vec<String>, PatchError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(PatchError::InvalidPath {
            path: path.to_string(),
            reason: "paths must be empty or start with '/'".to_string(),
        });
    };

    rest.split('/')
        .map(|segment| {
            unescape_token(segment).ok_or_else(|| PatchError::InvalidPath {
                path: path.to_string(),
                reason: format!("bad escape sequence in segment '{}'", segment),
            })
        })
        .collect()
}

fn unescape_token(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn parse_index(token: &str) -> Option<usize> {
    let well_formed = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if well_formed {
        token.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_creates_and_overwrites_members() {
        let mut model = json!({"a": 1});

        apply(
            &mut model,
            &[
                UpdateOperation::add("/b", json!(2)),
                UpdateOperation::add("/a", json!(10)),
            ],
        )
        .unwrap();

        assert_eq!(model, json!({"a": 10, "b": 2}));
    }

    #[test]
    fn add_inserts_into_arrays() {
        let mut model = json!({"items": [1, 3]});

        apply(
            &mut model,
            &[
                UpdateOperation::add("/items/1", json!(2)),
                UpdateOperation::add("/items/-", json!(4)),
            ],
        )
        .unwrap();

        assert_eq!(model, json!({"items": [1, 2, 3, 4]}));
    }

    #[test]
    fn operations_apply_in_list_order() {
        let mut model = json!({});

        apply(
            &mut model,
            &[
                UpdateOperation::add("/x", json!(1)),
                UpdateOperation::replace("/x", json!(2)),
                UpdateOperation::remove("/x"),
                UpdateOperation::add("/x", json!(3)),
            ],
        )
        .unwrap();

        assert_eq!(model, json!({"x": 3}));
    }

    #[test]
    fn nested_paths_address_inner_fields() {
        let mut model = json!({"user": {"name": "ada", "langs": ["en"]}});

        apply(
            &mut model,
            &[
                UpdateOperation::replace("/user/name", json!("grace")),
                UpdateOperation::replace("/user/langs/0", json!("fr")),
            ],
        )
        .unwrap();

        assert_eq!(model, json!({"user": {"name": "grace", "langs": ["fr"]}}));
    }

    #[test]
    fn empty_path_addresses_the_root() {
        let mut model = json!({"old": true});

        apply(&mut model, &[UpdateOperation::replace("", json!({"new": true}))]).unwrap();

        assert_eq!(model, json!({"new": true}));
    }

    #[test]
    fn replace_requires_existing_target() {
        let mut model = json!({"a": 1});

        let result = apply(&mut model, &[UpdateOperation::replace("/b", json!(2))]);

        assert!(matches!(result, Err(PatchError::MissingTarget { op: "replace", .. })));
    }

    #[test]
    fn remove_requires_existing_target() {
        let mut model = json!({"a": 1});

        let result = apply(&mut model, &[UpdateOperation::remove("/b")]);

        assert!(matches!(result, Err(PatchError::MissingTarget { op: "remove", .. })));
    }

    #[test]
    fn add_requires_existing_parent() {
        let mut model = json!({});

        let result = apply(&mut model, &[UpdateOperation::add("/a/b", json!(1))]);

        assert!(matches!(result, Err(PatchError::MissingParent { .. })));
    }

    #[test]
    fn malformed_path_aborts_before_any_mutation() {
        let mut model = json!({"a": 1});

        let result = apply(
            &mut model,
            &[
                UpdateOperation::replace("/a", json!(2)),
                UpdateOperation::add("no-slash", json!(3)),
            ],
        );

        assert!(matches!(result, Err(PatchError::InvalidPath { .. })));
        assert_eq!(model, json!({"a": 1}));
    }

    #[test]
    fn failing_operation_leaves_model_untouched() {
        let mut model = json!({"a": 1});

        let result = apply(
            &mut model,
            &[
                UpdateOperation::replace("/a", json!(2)),
                UpdateOperation::remove("/missing"),
            ],
        );

        assert!(result.is_err());
        assert_eq!(model, json!({"a": 1}));
    }

    #[test]
    fn escaped_segments_are_unescaped() {
        assert_eq!(parse_path("/a~1b/c~0d").unwrap(), vec!["a/b", "c~d"]);
        assert!(parse_path("/bad~2").is_err());
    }

    #[test]
    fn array_indices_must_be_canonical() {
        let mut model = json!({"items": [1, 2]});

        let result = apply(&mut model, &[UpdateOperation::add("/items/01", json!(0))]);

        assert!(matches!(result, Err(PatchError::InvalidIndex { .. })));
    }

    #[test]
    fn adding_under_a_scalar_is_rejected() {
        let mut model = json!({"n": 5});

        let result = apply(&mut model, &[UpdateOperation::add("/n/x", json!(1))]);

        assert!(matches!(result, Err(PatchError::NotAContainer { .. })));
    }
}
