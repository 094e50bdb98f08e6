//! Structural document edits (RFC 6902 flavoured).
//!
//! The interpreter never mutates its model directly. Actions describe their
//! changes as an ordered list of [`PatchOperation`]s and this module turns the
//! old model into a new one.
//!
//! Application is copy-in/copy-out: [`apply_patch`] borrows the input
//! document and returns a fresh one, so a failing operation halfway through
//! a sequence leaves nothing half-applied for the caller to see.
//!
//! # Example
//!
//! ```rust
//! use statecraft::patch::{apply_patch, PatchOperation};
//! use serde_json::json;
//!
//! let model = json!({ "track": 1, "tags": ["a"] });
//! let next = apply_patch(
//!     &model,
//!     &[
//!         PatchOperation::replace("/track", json!(2)),
//!         PatchOperation::add("/tags/-", json!("b")),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(next, json!({ "track": 2, "tags": ["a", "b"] }));
//! assert_eq!(model, json!({ "track": 1, "tags": ["a"] }));
//! ```

mod error;
mod operation;

pub use error::PatchError;
pub use operation::{PatchOp, PatchOperation};

use serde_json::Value;
use tracing::trace;

/// Check that every operation carries the fields its `op` requires.
///
/// Only the shape is checked; paths are resolved during application.
pub fn validate(operations: &[PatchOperation]) -> Result<(), PatchError> {
    for (index, operation) in operations.iter().enumerate() {
        if !is_pointer(&operation.path) {
            return Err(PatchError::InvalidPath {
                index,
                path: operation.path.clone(),
            });
        }
        if operation.op.needs_value() && operation.value.is_none() {
            return Err(PatchError::MissingValue {
                index,
                op: operation.op,
            });
        }
        match (&operation.from, operation.op.needs_from()) {
            (None, true) => {
                return Err(PatchError::MissingFrom {
                    index,
                    op: operation.op,
                })
            }
            (Some(from), true) if !is_pointer(from) => {
                return Err(PatchError::InvalidPath {
                    index,
                    path: from.clone(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

/// Validate then apply `operations` in order, returning the new document.
///
/// `document` is left untouched whatever the outcome.
pub fn apply_patch(document: &Value, operations: &[PatchOperation]) -> Result<Value, PatchError> {
    validate(operations)?;

    let mut next = document.clone();
    for (index, operation) in operations.iter().enumerate() {
        trace!(index, op = %operation.op, path = %operation.path, "applying patch operation");
        apply_operation(&mut next, operation, index)?;
    }
    Ok(next)
}

fn apply_operation(
    document: &mut Value,
    operation: &PatchOperation,
    index: usize,
) -> Result<(), PatchError> {
    let path = operation.path.as_str();
    let value = || operation.value.clone().unwrap_or(Value::Null);

    match operation.op {
        PatchOp::Add => add(document, path, value(), index),
        PatchOp::Remove => remove(document, path, index).map(|_| ()),
        PatchOp::Replace => {
            let target = lookup_mut(document, path).ok_or_else(|| unresolvable(index, path))?;
            *target = value();
            Ok(())
        }
        PatchOp::Move => {
            let from = operation.from.as_deref().unwrap_or_default();
            if lookup(document, from).is_none() {
                return Err(PatchError::FromUnresolvable {
                    index,
                    from: from.to_string(),
                });
            }
            if from == path {
                return Ok(());
            }
            if path.starts_with(&format!("{from}/")) {
                return Err(PatchError::MoveIntoDescendant {
                    index,
                    from: from.to_string(),
                    path: path.to_string(),
                });
            }
            let moved = remove(document, from, index).map_err(|_| PatchError::FromUnresolvable {
                index,
                from: from.to_string(),
            })?;
            add(document, path, moved, index)
        }
        PatchOp::Copy => {
            let from = operation.from.as_deref().unwrap_or_default();
            let copied = lookup(document, from)
                .cloned()
                .ok_or_else(|| PatchError::FromUnresolvable {
                    index,
                    from: from.to_string(),
                })?;
            add(document, path, copied, index)
        }
        PatchOp::Test => {
            let actual = lookup(document, path).ok_or_else(|| unresolvable(index, path))?;
            if *actual == value() {
                Ok(())
            } else {
                Err(PatchError::TestFailed {
                    index,
                    path: path.to_string(),
                })
            }
        }
    }
}

fn add(document: &mut Value, path: &str, value: Value, index: usize) -> Result<(), PatchError> {
    let Some((parent, token)) = split(path) else {
        *document = value;
        return Ok(());
    };

    match lookup_mut(document, parent).ok_or_else(|| unresolvable(index, path))? {
        Value::Object(map) => {
            map.insert(token, value);
            Ok(())
        }
        Value::Array(items) => {
            let position = if token == "-" {
                items.len()
            } else {
                array_index(&token).ok_or_else(|| PatchError::IllegalArrayIndex {
                    index,
                    path: path.to_string(),
                })?
            };
            if position > items.len() {
                return Err(PatchError::IndexOutOfBounds {
                    index,
                    path: path.to_string(),
                });
            }
            items.insert(position, value);
            Ok(())
        }
        _ => Err(PatchError::CannotAdd {
            index,
            path: path.to_string(),
        }),
    }
}

fn remove(document: &mut Value, path: &str, index: usize) -> Result<Value, PatchError> {
    let Some((parent, token)) = split(path) else {
        return Ok(std::mem::replace(document, Value::Null));
    };

    match lookup_mut(document, parent).ok_or_else(|| unresolvable(index, path))? {
        Value::Object(map) => map
            .shift_remove(&token)
            .ok_or_else(|| unresolvable(index, path)),
        Value::Array(items) => match array_index(&token) {
            Some(position) if position < items.len() => Ok(items.remove(position)),
            _ => Err(unresolvable(index, path)),
        },
        _ => Err(unresolvable(index, path)),
    }
}

fn unresolvable(index: usize, path: &str) -> PatchError {
    PatchError::PathUnresolvable {
        index,
        path: path.to_string(),
    }
}

fn is_pointer(path: &str) -> bool {
    path.is_empty() || path.starts_with('/')
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    document.pointer(path)
}

fn lookup_mut<'a>(document: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    document.pointer_mut(path)
}

/// Split a non-root pointer into its parent pointer and unescaped last token.
fn split(path: &str) -> Option<(&str, String)> {
    let (parent, token) = path.rsplit_once('/')?;
    Some((parent, token.replace("~1", "/").replace("~0", "~")))
}

fn array_index(token: &str) -> Option<usize> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if canonical {
        token.parse().ok()
    } else {
        None
    }
}
