//! Error types for the annotation core.

use thiserror::Error;

use crate::annotation_type::{AnnotationType, Layer};

/// Errors raised while building or mutating an [`AnnotationContainer`](crate::AnnotationContainer).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KafError {
    /// A payload was built without the targets its type requires.
    #[error("{annotation_type:?} requires at least one {what}")]
    EmptySpan {
        annotation_type: AnnotationType,
        what: &'static str,
    },

    /// A head was designated that is not one of the span's targets.
    #[error("span head is not one of its targets")]
    HeadNotInSpan,

    /// An identifiable annotation was stored without an id.
    #[error("{0:?} annotations must carry an id")]
    MissingId(AnnotationType),

    /// An anonymous annotation was given an id.
    #[error("{annotation_type:?} annotations are anonymous, got id {id:?}")]
    UnexpectedId {
        annotation_type: AnnotationType,
        id: String,
    },

    /// The id is already used by another annotation of the container.
    #[error("duplicate id {0:?}")]
    DuplicateId(String),

    /// A handle does not resolve to a live annotation of this container.
    #[error("unknown annotation #{0}")]
    UnknownAnnotation(usize),

    /// A reference resolved to an annotation of the wrong type.
    #[error("expected a reference to {expected:?}, found {found:?}")]
    TypeMismatch {
        expected: Vec<AnnotationType>,
        found: AnnotationType,
    },

    /// A sub-annotation already belongs to another parent.
    #[error("annotation #{child} is already owned by #{owner}")]
    AlreadyOwned { child: usize, owner: usize },

    /// `remove` was refused because surviving annotations still point into the layer.
    #[error("layer {layer:?} is still referenced by {referenced_by}")]
    LayerReferenced { layer: Layer, referenced_by: String },

    /// A dependency-path pattern did not translate into a valid regular expression.
    #[error("invalid dependency path pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// RON encoding or decoding of a snapshot failed.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Result type for annotation core operations.
pub type Result<T> = std::result::Result<T, KafError>;
