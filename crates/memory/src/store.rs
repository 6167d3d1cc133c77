//! The content-store port.
//!
//! Writers depend on this trait only. The GitHub adapter lives in the
//! `github` crate; tests use [`crate::fakes::InMemoryContentStore`].

use async_trait::async_trait;

use crate::{CommitResult, ContentPath, FileEntry, RemoteFile, RevisionSha, StoreError};

/// A remote, version-controlled file store addressed by path.
///
/// Every call targets the branch the implementation was configured with.
/// Implementations must map a missing path to [`StoreError::NotFound`] and
/// every other non-success response to [`StoreError::Rejected`] carrying the
/// store's message.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Reads a file and its current revision.
    async fn get_file(&self, path: &ContentPath) -> Result<RemoteFile, StoreError>;

    /// Creates or updates a file.
    ///
    /// `revision` must be the current revision when `path` already exists and
    /// `None` when it does not. A stale revision makes the write fail.
    async fn put_file(
        &self,
        path: &ContentPath,
        content: &str,
        message: &str,
        revision: Option<&RevisionSha>,
    ) -> Result<CommitResult, StoreError>;

    /// Lists the entries of a directory.
    async fn list_files(&self, dir: &ContentPath) -> Result<Vec<FileEntry>, StoreError>;

    /// Deletes a file at its current revision.
    async fn delete_file(
        &self,
        path: &ContentPath,
        revision: &RevisionSha,
        message: &str,
    ) -> Result<(), StoreError>;
}
