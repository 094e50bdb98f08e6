//! Patch application errors.

use super::operation::PatchOp;
use thiserror::Error;

/// Errors raised while validating or applying a patch sequence.
///
/// `index` is the position of the offending operation in the sequence.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatchError {
    #[error("Operation {index}: path '{path}' must be empty or start with '/'")]
    InvalidPath { index: usize, path: String },

    #[error("Operation {index}: `{op}` requires a `value`")]
    MissingValue { index: usize, op: PatchOp },

    #[error("Operation {index}: `{op}` requires a `from`")]
    MissingFrom { index: usize, op: PatchOp },

    #[error("Operation {index}: cannot perform the operation at '{path}', which does not exist")]
    PathUnresolvable { index: usize, path: String },

    #[error("Operation {index}: cannot take a value from '{from}', which does not exist")]
    FromUnresolvable { index: usize, from: String },

    #[error("Operation {index}: '{path}' does not end in a valid array index")]
    IllegalArrayIndex { index: usize, path: String },

    #[error("Operation {index}: array index in '{path}' is out of bounds")]
    IndexOutOfBounds { index: usize, path: String },

    #[error("Operation {index}: cannot add at '{path}', its parent is not a container")]
    CannotAdd { index: usize, path: String },

    #[error("Operation {index}: cannot move '{from}' into its own child '{path}'")]
    MoveIntoDescendant {
        index: usize,
        from: String,
        path: String,
    },

    #[error("Operation {index}: test failed at '{path}'")]
    TestFailed { index: usize, path: String },
}
