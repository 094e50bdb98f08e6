//! Patch operation values.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// The six operations of an RFC 6902 patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Remove => "remove",
            PatchOp::Replace => "replace",
            PatchOp::Move => "move",
            PatchOp::Copy => "copy",
            PatchOp::Test => "test",
        }
    }

    pub(crate) fn needs_value(&self) -> bool {
        matches!(self, PatchOp::Add | PatchOp::Replace | PatchOp::Test)
    }

    pub(crate) fn needs_from(&self) -> bool {
        matches!(self, PatchOp::Move | PatchOp::Copy)
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural edit of a JSON document.
///
/// Shapes that do not fit their `op` (a `move` without `from`, an `add`
/// without `value`) are representable so they can be reported instead of
/// rejected at deserialization time.
///
/// # Example
///
/// ```rust
/// use statecraft::patch::{PatchOp, PatchOperation};
/// use serde_json::json;
///
/// let op: PatchOperation =
///     serde_json::from_value(json!({ "op": "add", "path": "/a", "value": null })).unwrap();
/// assert_eq!(op.op, PatchOp::Add);
/// assert_eq!(op.value, Some(json!(null)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// Keep an explicit `null` value distinct from an absent one.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
    fn with_value(op: PatchOp, path: impl Into<String>, value: Value) -> Self {
        Self {
            op,
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    fn with_from(op: PatchOp, from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }

    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOp::Add, path, value)
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOp::Replace, path, value)
    }

    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOp::Test, path, value)
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: None,
            from: None,
        }
    }

    pub fn move_value(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_from(PatchOp::Move, from, path)
    }

    pub fn copy_value(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_from(PatchOp::Copy, from, path)
    }
}
