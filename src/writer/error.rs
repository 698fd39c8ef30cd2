//! Contains the error types produced by the writer.

use std::io;
use std::result::Result as StdResult;
use std::sync::Arc;

use thiserror::Error;

use crate::writer::node::{NodeFlags, NodeKind};

pub type Result<T> = StdResult<T, Error>;

/// A writer error.
///
/// Sink failures are shared through an `Arc` so that the first one can be replayed
/// on every subsequent call without retrying the underlying I/O.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("I/O error: {cause}")]
    Io {
        #[source]
        cause: Arc<io::Error>,
    },

    #[error("structure error: {cause}")]
    Structure {
        #[from]
        cause: StructureError,
    },

    #[error("content error: {cause}")]
    Content {
        #[from]
        cause: ContentError,
    },
}

impl From<io::Error> for Error {
    fn from(cause: io::Error) -> Error {
        Error::Io { cause: Arc::new(cause) }
    }
}

impl Error {
    /// Returns the underlying I/O error if this is a sink failure.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::Io { cause } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

/// Violations of the nesting rules of the node stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("unexpected kind {actual}, expected {expected}")]
    UnexpectedKind { actual: NodeKind, expected: NodeFlags },

    #[error("could not pop node")]
    EmptyStack,

    #[error("{kind} name '{actual}' did not match expected '{expected}'")]
    NameMismatch {
        kind: NodeKind,
        actual: String,
        expected: String,
    },

    #[error("tried to end {kind} by name, but the node was not named")]
    Unnamed { kind: NodeKind },

    #[error("uri already exists for ns prefix {prefix}")]
    NamespaceConflict { prefix: String },

    #[error("attribute written after the start tag was terminated")]
    AttributeAfterStartTag,

    #[error("attribute {name} has a namespace uri but no prefix")]
    UnprefixedNamespace { name: String },
}

/// Violations of the character-level productions of node names and content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("invalid name at position {position}: {found:?}")]
    InvalidName { position: usize, found: char },

    #[error("invalid chars at position {position}: {found:?}")]
    InvalidChars { position: usize, found: char },

    #[error("invalid pubid at position {position}: {found:?}")]
    InvalidPubId { position: usize, found: char },

    #[error("invalid encoding at position {position}: {found:?}")]
    InvalidEncoding { position: usize, found: char },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{context} may not contain '{sequence}'")]
    ForbiddenSequence {
        context: &'static str,
        sequence: &'static str,
    },

    #[error("{context} must only contain double or single quotes, not both")]
    AmbiguousQuotes { context: &'static str },

    #[error("comment may not end with '-'")]
    CommentEndsWithHyphen,

    #[error("processing instruction target may not be 'xml'")]
    ReservedTarget,

    #[error("public ID provided but system ID missing")]
    MissingSystemId,

    #[error("{context} requires an external ID")]
    MissingExternalId { context: &'static str },

    #[error("{first} and {second} cannot both be provided")]
    Conflicting {
        first: &'static str,
        second: &'static str,
    },

    #[error("encoding '{label}' is not supported")]
    UnsupportedEncoding { label: String },
}
