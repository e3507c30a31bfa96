use crate::{
    cursor::CursorError,
    types::{Cardinality, FieldKind, ResourceKind},
};
use thiserror::Error as ThisError;

///
/// RenderError
///
/// Runtime failure surface for the preload and render phases. Any variant
/// aborts the whole render; no partial output is ever produced.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum RenderError {
    #[error("{resource}.{association}: expected {expected} related entities")]
    CardinalityMismatch {
        resource: ResourceKind,
        association: &'static str,
        expected: Cardinality,
    },

    #[error("{resource}.{field}: compute failed: {message}")]
    Compute {
        resource: ResourceKind,
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error("render deadline exceeded")]
    DeadlineExceeded,

    #[error("{resource}: render exceeded max depth {max_depth}")]
    DepthExceeded {
        resource: ResourceKind,
        max_depth: usize,
    },

    #[error("{resource}.{field}: value {value:?} is not an allowed enum member")]
    EnumViolation {
        resource: ResourceKind,
        field: &'static str,
        value: String,
    },

    #[error("page limit must be greater than zero")]
    InvalidPageLimit,

    #[error("{resource}.{association}: required related entity is missing")]
    MissingRelated {
        resource: ResourceKind,
        association: &'static str,
    },

    #[error("{resource}.{field}: non-nullable field resolved to no value")]
    MissingValue {
        resource: ResourceKind,
        field: &'static str,
    },

    #[error("{resource}: preload failed: {message}")]
    Preload {
        resource: ResourceKind,
        message: String,
    },

    #[error("{resource}.{field}: expected {expected}, got {got}")]
    TypeMismatch {
        resource: ResourceKind,
        field: &'static str,
        expected: FieldKind,
        got: &'static str,
    },

    #[error("{resource}.{association}: entity does not expose this association")]
    UnknownAssociation {
        resource: ResourceKind,
        association: &'static str,
    },

    #[error("no schema registered for resource kind '{kind}'")]
    UnknownResource { kind: ResourceKind },
}

impl RenderError {
    /// Construct a compute-field failure.
    pub fn compute(
        resource: ResourceKind,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Compute {
            resource,
            field,
            message: message.into(),
        }
    }

    /// Construct a preload failure for one resource kind's batch.
    pub fn preload(resource: ResourceKind, message: impl Into<String>) -> Self {
        Self::Preload {
            resource,
            message: message.into(),
        }
    }
}
