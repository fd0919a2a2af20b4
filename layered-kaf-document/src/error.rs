//! Error types for document-level operations.

use layered_kaf::KafError;
use thiserror::Error;

/// Errors raised by [`KafDocument`](crate::KafDocument) and its configuration.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// An annotation operation on the owned container failed.
    #[error(transparent)]
    Kaf(#[from] KafError),

    /// A configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for [`DocumentConfig`](crate::DocumentConfig).
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("cannot join an empty list of documents")]
    EmptyJoin,

    /// A bracketed constituency parse could not be read.
    #[error("malformed parse at byte {position}: {message}")]
    MalformedParse {
        position: usize,
        message: &'static str,
    },

    /// A bracketed parse has a different number of leaves than there are terms to cover.
    #[error("parse has {leaves} leaves but there are {terms} terms")]
    LeafCountMismatch { leaves: usize, terms: usize },
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
