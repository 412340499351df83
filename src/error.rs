//! The crate's ambient error type.
//!
//! Per the allocation model, "not enough space" and "redundancy
//! unsatisfiable" are not errors: [`crate::facade::allocate`] returns `Ok`
//! with a zero or partial [`crate::segment::AllocationResult`] in those
//! cases. [`AllocError`] is reserved for malformed requests, the cases a
//! caller can only have reached by constructing a [`crate::request::Request`]
//! incorrectly.

use thiserror::Error;

/// Reasons [`crate::facade::allocate`] can refuse to run at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// `request.sources` was empty; there is nowhere to allocate from.
    #[error("allocation request has no sources")]
    EmptySourceList,

    /// `cling_tag_list` contained a string that isn't a valid tag
    /// expression (`@*` or `@tagname`).
    #[error("invalid tag match expression: {0:?}")]
    InvalidTagExpression(String),
}
