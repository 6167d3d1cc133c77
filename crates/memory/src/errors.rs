//! Error types for the save protocol.
//!
//! [`StoreError`] is what a [`crate::ContentStore`] implementation reports.
//! [`WriteError`] is what the writers surface to their caller. Cleanup
//! failures are deliberately absent from [`WriteError`]: they are recorded in
//! [`crate::CleanupReport`] and never abort a save.

use thiserror::Error;

use crate::ContentPath;

/// Errors reported by a content store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The path does not exist on the configured branch.
    ///
    /// Writers treat this as "no prior revision" on reads and as "nothing to
    /// clean up" on listings.
    #[error("Not found: {path}")]
    NotFound {
        /// The path that was requested.
        path: ContentPath,
    },

    /// The store answered with a non-success status.
    ///
    /// Stale or missing revisions on overwrite land here (GitHub answers 409
    /// or 422). They are not retried.
    #[error("Store rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status code of the response.
        status: u16,
        /// Message reported by the store.
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The response could not be decoded into the expected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of the decoding problem.
        message: String,
    },
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` when the store refused a write because the supplied
    /// revision did not match the current one.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Rejected { status: 409, .. })
    }
}

/// An explicitly supplied session id that cannot be used in a filename.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid session id '{value}': must not contain '/'")]
pub struct InvalidSessionId {
    /// The rejected value, as given.
    pub value: String,
}

/// Errors surfaced by [`crate::MemoryWriter`] and [`crate::SummaryWriter`].
#[derive(Debug, Error)]
pub enum WriteError {
    /// Reading the current revision or writing the file failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The summary text was empty after trimming.
    #[error("Summary is empty")]
    EmptySummary,

    /// The session id produced a path the store cannot address.
    #[error("Invalid target path for session '{session}'")]
    InvalidPath {
        /// The offending session id.
        session: String,
    },
}
