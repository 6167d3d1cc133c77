//! The memory and summary writers.
//!
//! Both writers follow the same read-then-write sequence against a
//! [`ContentStore`]: fetch the current revision of the target path (a missing
//! path means "create"), then put the new content with that revision. There
//! is no retry; a stale revision surfaces as [`StoreError::Rejected`].
//!
//! [`MemoryWriter`] additionally deletes older files of the same session
//! before writing. That cleanup is best-effort: its failures are collected in
//! a [`CleanupReport`] and logged, and the write goes ahead regardless.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::layout::{summary_path, MemoryTarget};
use crate::{
    CleanupFailure, CleanupReport, CommitResult, ContentStore, EntryKind, MemorySaveReport,
    Redactor, SessionId, StoreError, StoredFile, WriteError,
};

// ---------------------------------------------------------------------------
// Shared write path
// ---------------------------------------------------------------------------

/// Resolves the current revision of `file.path` and writes `file` with it.
async fn write_through(
    store: &dyn ContentStore,
    mut file: StoredFile,
) -> Result<CommitResult, StoreError> {
    file.revision = match store.get_file(&file.path).await {
        Ok(existing) => Some(existing.revision),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };
    debug!(
        path = %file.path,
        overwrite = file.revision.is_some(),
        "Writing file"
    );
    store
        .put_file(
            &file.path,
            &file.content,
            &file.message,
            file.revision.as_ref(),
        )
        .await
}

// ---------------------------------------------------------------------------
// Per-session serialization
// ---------------------------------------------------------------------------

/// One async mutex per session id, created on demand.
///
/// Entries nobody holds are dropped the next time a lock is requested.
#[derive(Debug, Default)]
struct SessionLocks {
    inner: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    fn lock_for(&self, session: &SessionId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(map.entry(session.clone()).or_default())
    }
}

// ---------------------------------------------------------------------------
// MemoryWriter
// ---------------------------------------------------------------------------

/// Saves conversations as `memories/{YYYY-MM}/{YYYY-MM-DD}_{session}.md`.
pub struct MemoryWriter {
    store: Arc<dyn ContentStore>,
    redactor: Redactor,
    locks: SessionLocks,
}

impl MemoryWriter {
    /// Creates a writer over `store` that redacts known token shapes.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            redactor: Redactor::new(),
            locks: SessionLocks::default(),
        }
    }

    /// Replaces the redactor applied to content before it is stored.
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Saves `content` for `session` under today's UTC date.
    ///
    /// A `None` session is filed under `unknown`.
    pub async fn save_memory(
        &self,
        content: &str,
        session: Option<&SessionId>,
    ) -> Result<MemorySaveReport, WriteError> {
        self.save_memory_at(content, session, Utc::now()).await
    }

    /// Saves `content` for `session` under the UTC date of `now`.
    #[instrument(
        name = "save_memory",
        skip_all,
        fields(session = tracing::field::Empty, path = tracing::field::Empty)
    )]
    pub async fn save_memory_at(
        &self,
        content: &str,
        session: Option<&SessionId>,
        now: DateTime<Utc>,
    ) -> Result<MemorySaveReport, WriteError> {
        let session = session.cloned().unwrap_or_else(SessionId::unknown);
        let target = MemoryTarget::at(now, &session).ok_or_else(|| WriteError::InvalidPath {
            session: session.to_string(),
        })?;

        let span = tracing::Span::current();
        span.record("session", session.as_str());
        span.record("path", target.path.as_str());

        let (content, redactions) = self.redactor.redact(content);
        if redactions > 0 {
            info!(redactions, "Removed credentials from memory content");
        }

        let lock = self.locks.lock_for(&session);
        let _guard = lock.lock().await;

        let cleanup = self.remove_superseded(&target, &session).await;

        let file = StoredFile {
            path: target.path.clone(),
            content,
            revision: None,
            message: format!("Save memory: {}", target.day),
        };
        let commit = write_through(self.store.as_ref(), file).await?;
        info!(
            commit = %commit.commit,
            deleted = cleanup.deleted.len(),
            cleanup_failures = cleanup.failures.len(),
            "Saved memory"
        );

        Ok(MemorySaveReport {
            commit,
            cleanup,
            redactions,
        })
    }

    /// Deletes older files of `session` in the target's month directory.
    async fn remove_superseded(&self, target: &MemoryTarget, session: &SessionId) -> CleanupReport {
        let mut report = CleanupReport::default();

        let entries = match self.store.list_files(&target.dir).await {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => {
                debug!(dir = %target.dir, "Memory directory does not exist yet");
                return report;
            }
            Err(e) => {
                warn!(dir = %target.dir, error = %e, "Could not list memory directory; skipping cleanup");
                report.failures.push(CleanupFailure {
                    path: None,
                    message: e.to_string(),
                });
                return report;
            }
        };

        let stale = entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::File)
            .filter(|entry| target.is_superseded(&entry.name, session));

        for entry in stale {
            let message = format!("Remove superseded session file: {}", entry.name);
            match self
                .store
                .delete_file(&entry.path, &entry.revision, &message)
                .await
            {
                Ok(()) => {
                    info!(path = %entry.path, "Deleted superseded memory file");
                    report.deleted.push(entry.path);
                }
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "Could not delete superseded memory file");
                    report.failures.push(CleanupFailure {
                        path: Some(entry.path),
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

// ---------------------------------------------------------------------------
// SummaryWriter
// ---------------------------------------------------------------------------

/// Saves the overview file at the fixed path `summary.md`.
pub struct SummaryWriter {
    store: Arc<dyn ContentStore>,
    redactor: Redactor,
    lock: tokio::sync::Mutex<()>,
}

impl SummaryWriter {
    /// Creates a writer over `store` that redacts known token shapes.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            redactor: Redactor::new(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Replaces the redactor applied to content before it is stored.
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Overwrites `summary.md` with `content`.
    ///
    /// Content that is empty after trimming is rejected before any store call.
    #[instrument(name = "save_summary", skip_all)]
    pub async fn save_summary(&self, content: &str) -> Result<CommitResult, WriteError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(WriteError::EmptySummary);
        }
        let (content, redactions) = self.redactor.redact(content);
        if redactions > 0 {
            info!(redactions, "Removed credentials from summary content");
        }

        let _guard = self.lock.lock().await;
        let file = StoredFile {
            path: summary_path(),
            content,
            revision: None,
            message: "Update summary".to_string(),
        };
        let commit = write_through(self.store.as_ref(), file).await?;
        info!(commit = %commit.commit, "Saved summary");
        Ok(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_locks_share_per_session_and_prune_idle_entries() {
        let locks = SessionLocks::default();
        let a = SessionId::new("a").unwrap();
        let b = SessionId::new("b").unwrap();

        let first = locks.lock_for(&a);
        let again = locks.lock_for(&a);
        assert!(Arc::ptr_eq(&first, &again));

        let other = locks.lock_for(&b);
        assert!(!Arc::ptr_eq(&first, &other));

        drop(other);
        let _ = locks.lock_for(&a);
        let map = locks.inner.lock().unwrap();
        assert!(!map.contains_key(&b));
        assert!(map.contains_key(&a));
    }
}
