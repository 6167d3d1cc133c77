//! Value types exchanged between the writers and a [`crate::ContentStore`].

use serde::{Deserialize, Serialize};

use crate::{CommitSha, ContentPath, RevisionSha};

// ---------------------------------------------------------------------------
// Store-side records
// ---------------------------------------------------------------------------

/// Kind of an entry returned by a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A sub-directory.
    Dir,
    /// Anything else the store reports (symlinks, submodules).
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Entry name (last path segment).
    pub name: String,
    /// Full path of the entry.
    pub path: ContentPath,
    /// Current revision, needed to delete the entry.
    pub revision: RevisionSha,
    /// Entry kind.
    pub kind: EntryKind,
}

/// A file read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Path of the file.
    pub path: ContentPath,
    /// Decoded UTF-8 content.
    pub content: String,
    /// Current revision of the file.
    pub revision: RevisionSha,
}

/// Outcome of a successful create-or-update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    /// Path that was written.
    pub path: ContentPath,
    /// Revision of the newly written content.
    pub revision: RevisionSha,
    /// Commit created by the write.
    pub commit: CommitSha,
    /// Web URL of the commit, when the store reports one.
    pub html_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Write requests
// ---------------------------------------------------------------------------

/// A file about to be written.
///
/// `revision` is `None` when the path does not exist yet and `Some` with the
/// current revision when the write overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Target path.
    pub path: ContentPath,
    /// Content after redaction.
    pub content: String,
    /// Revision being replaced, if any.
    pub revision: Option<RevisionSha>,
    /// Commit message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Save reports
// ---------------------------------------------------------------------------

/// A stale-file cleanup step that failed without aborting the save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupFailure {
    /// The file whose deletion failed; `None` when the listing itself failed.
    pub path: Option<ContentPath>,
    /// Error message reported by the store.
    pub message: String,
}

/// What the stale-file cleanup did before the new file was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Older files of the same session that were deleted.
    pub deleted: Vec<ContentPath>,
    /// Non-fatal failures encountered while listing or deleting.
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// Returns `true` if every cleanup step succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of [`crate::MemoryWriter::save_memory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySaveReport {
    /// The write of the new memory file.
    pub commit: CommitResult,
    /// Stale-file cleanup performed before the write.
    pub cleanup: CleanupReport,
    /// Number of credential-shaped substrings removed from the content.
    pub redactions: usize,
}
