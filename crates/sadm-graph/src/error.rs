//! Error taxonomy for graph operations.

use sadm_id::{EntityId, IdError};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::AttributeTag;
use crate::value::ValueType;

/// Errors returned by entity, relationship and container operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Missing id, attribute value, or descriptor.
    #[error("not found: {0}")]
    NotFound(String),

    /// Null id or a well-formed but out-of-domain value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No schema entry for the pair, or a containment/arity violation.
    #[error("invalid relationship {from} -> {to}: {reason}")]
    InvalidRelationship {
        from: EntityId,
        to: EntityId,
        reason: String,
    },

    #[error("value type mismatch for {tag}: expected {expected}, got {actual}")]
    ValueTypeMismatch {
        tag: AttributeTag,
        expected: ValueType,
        actual: ValueType,
    },

    /// Duplicate insertion where at most one is allowed.
    #[error("not unique: {0}")]
    NotUnique(String),

    /// Illegal lifecycle transition or a broken store invariant.
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error(transparent)]
    Id(#[from] IdError),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NotFound(_) => ErrorKind::NotFound,
            GraphError::InvalidArgument(_) | GraphError::Id(_) => ErrorKind::InvalidArgument,
            GraphError::InvalidRelationship { .. } => ErrorKind::InvalidRelationship,
            GraphError::ValueTypeMismatch { .. } => ErrorKind::ValueTypeMismatch,
            GraphError::NotUnique(_) => ErrorKind::NotUnique,
            GraphError::Invariant(_) => ErrorKind::Error,
        }
    }

    pub(crate) fn invalid_relationship(
        from: EntityId,
        to: EntityId,
        reason: impl Into<String>,
    ) -> Self {
        GraphError::InvalidRelationship {
            from,
            to,
            reason: reason.into(),
        }
    }
}

/// Coarse classification of a [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidRelationship,
    ValueTypeMismatch,
    NotUnique,
    Error,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidRelationship => "invalid_relationship",
            ErrorKind::ValueTypeMismatch => "value_type_mismatch",
            ErrorKind::NotUnique => "not_unique",
            ErrorKind::Error => "error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
