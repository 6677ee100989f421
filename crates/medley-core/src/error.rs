//! Error types for Medley.

use crate::media::MediaKind;
use crate::time::Timestamp;
use std::collections::TryReserveError;
use thiserror::Error;

/// Main error type for Medley operations.
#[derive(Error, Debug)]
pub enum MedleyError {
    #[error("allocation of {requested} bytes failed")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("invalid payload layout: {0}")]
    InvalidLayout(String),

    #[error("expected a {expected} block, found {found}")]
    KindMismatch {
        expected: MediaKind,
        found: MediaKind,
    },

    #[error("{0} block buffer does not match its declared layout")]
    BlockIncomplete(MediaKind),

    #[error("negative duration {0}")]
    NegativeDuration(Timestamp),
}

/// Result type alias for Medley operations.
pub type Result<T> = std::result::Result<T, MedleyError>;
