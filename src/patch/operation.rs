//! Update operations addressed by slash-delimited paths.

use crate::patch::error::PatchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single model update operation.
///
/// Serializes to the JSON-Patch shape `{"op": "add", "path": "/a", "value": 1}`
/// so operation lists can be written by hand or loaded from JSON.
///
/// # Example
///
/// ```rust
/// use syncflow::patch::UpdateOperation;
/// use serde_json::json;
///
/// let op = UpdateOperation::add("/count", json!(1));
/// let encoded = serde_json::to_value(&op).unwrap();
/// assert_eq!(encoded, json!({"op": "add", "path": "/count", "value": 1}));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum UpdateOperation {
    /// Insert or overwrite a member, or insert into an array
    Add { path: String, value: Value },

    /// Overwrite an existing value
    Replace { path: String, value: Value },

    /// Delete an existing value
    Remove { path: String },
}

impl UpdateOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::Add {
            path: path.into(),
            value,
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::Replace {
            path: path.into(),
            value,
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self::Remove { path: path.into() }
    }

    /// The path this operation addresses.
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Replace { path, .. } | Self::Remove { path } => path,
        }
    }

    /// Lowercase operation name, as it appears in the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Replace { .. } => "replace",
            Self::Remove { .. } => "remove",
        }
    }
}

/// Turn a flat object into one `add` operation per top-level field.
///
/// Each operation's path is `prefix` followed by `/field`. Field names are
/// escaped so that names containing `/` or `~` address the right member.
///
/// # Example
///
/// ```rust
/// use syncflow::patch::{patch_from_fields, UpdateOperation};
/// use serde_json::json;
///
/// let ops = patch_from_fields("", &json!({"value": 3, "error": null})).unwrap();
/// assert!(ops.contains(&UpdateOperation::add("/value", json!(3))));
/// assert!(ops.contains(&UpdateOperation::add("/error", json!(null))));
/// ```
pub fn patch_from_fields(prefix: &str, fields: &Value) -> Result<Vec<UpdateOperation>, PatchError> {
    let Value::Object(map) = fields else {
        return Err(PatchError::NotAnObject {
            found: value_kind(fields).to_string(),
        });
    };

    Ok(map
        .iter()
        .map(|(key, value)| {
            UpdateOperation::add(format!("{}/{}", prefix, escape_token(key)), value.clone())
        })
        .collect())
}

pub(crate) fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
