use std::io;

use thiserror::Error;
use uuid::Uuid;

use crate::record::ArtifactKind;
use crate::traits::UnknownTrait;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a required value that’s missing or empty.
    #[error("{0}")]
    Validation(String),

    /// Represents a trait value outside its catalog.
    #[error(transparent)]
    InvalidTrait(#[from] UnknownTrait),

    /// Represents a request body that isn’t the expected JSON.
    #[error("malformed request: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    /// Represents a face image that isn’t valid base64.
    #[error("malformed face image: {0}")]
    MalformedImage(#[source] base64::DecodeError),

    #[error("invalid ID: {0}")]
    InvalidId(String),

    #[error("invalid artifact kind: {0}")]
    InvalidArtifactKind(String),

    #[error("certificate not found")]
    CertificateNotFound(Uuid),

    #[error("{kind} image not found")]
    ArtifactNotFound { id: Uuid, kind: ArtifactKind },

    /// Represents an attempt to modify a record whose artifacts were
    /// already attached.
    #[error("certificate {0} is already complete")]
    CertificateComplete(Uuid),

    /// Represents an ID collision when storing a new record.
    #[error("ID already exists")]
    IdAlreadyExists(Uuid),

    #[error("certificate storage is unavailable")]
    StorageUnavailable,

    #[error("render queue is closed")]
    QueueClosed,

    #[error("render queue is full")]
    QueueFull,

    #[error("I/O error")]
    Io(#[from] io::Error),
}

impl BackendError {
    /// Whether the error was caused by the caller’s input rather than by
    /// the server.
    pub fn is_validation_error(&self) -> bool {
        use BackendError::*;

        matches!(
            self,
            Validation(..) | InvalidTrait(..) | MalformedRequest(..) | MalformedImage(..)
        )
    }
}
