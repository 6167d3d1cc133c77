//! In-memory fake of [`ContentStore`] (testing only).
//!
//! Behaves like the GitHub Contents API where the writers can observe it:
//! directories exist only while they contain files, overwrites need the
//! current revision, and every call is recorded for assertions.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    CommitResult, CommitSha, ContentPath, ContentStore, EntryKind, FileEntry, RemoteFile,
    RevisionSha, StoreError,
};

/// A call received by [`InMemoryContentStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get {
        path: String,
    },
    Put {
        path: String,
        message: String,
        revision: Option<String>,
    },
    List {
        dir: String,
    },
    Delete {
        path: String,
        revision: String,
        message: String,
    },
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<ContentPath, (String, RevisionSha)>,
    next_revision: u64,
    calls: Vec<StoreCall>,
    fail_listing: bool,
    fail_deletes: HashSet<ContentPath>,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

/// Content store backed by a sorted map of path to `(content, revision)`.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    state: Mutex<State>,
}

impl InMemoryContentStore {
    /// An empty store with no injected failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file directly, bypassing call recording. Returns its revision.
    pub fn insert(&self, path: &ContentPath, content: &str) -> RevisionSha {
        let mut state = self.state.lock().unwrap();
        let n = state.bump();
        let revision = RevisionSha::new(format!("rev-{n}")).unwrap();
        state
            .files
            .insert(path.clone(), (content.to_string(), revision.clone()));
        revision
    }

    /// Makes every subsequent `list_files` fail with a 500.
    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }

    /// Makes `delete_file` on `path` fail with a 500.
    pub fn fail_delete(&self, path: &ContentPath) {
        self.state.lock().unwrap().fail_deletes.insert(path.clone());
    }

    /// Current content of `path`, if any.
    pub fn content(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .iter()
            .find(|(p, _)| p.as_str() == path)
            .map(|(_, (content, _))| content.clone())
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.files.keys().map(|p| p.as_str().to_string()).collect()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the `put_file` calls received so far.
    pub fn puts(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Put { .. }))
            .collect()
    }
}

fn server_error(message: &str) -> StoreError {
    StoreError::Rejected {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn get_file(&self, path: &ContentPath) -> Result<RemoteFile, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Get {
            path: path.to_string(),
        });
        state
            .files
            .get(path)
            .map(|(content, revision)| RemoteFile {
                path: path.clone(),
                content: content.clone(),
                revision: revision.clone(),
            })
            .ok_or_else(|| StoreError::NotFound { path: path.clone() })
    }

    async fn put_file(
        &self,
        path: &ContentPath,
        content: &str,
        message: &str,
        revision: Option<&RevisionSha>,
    ) -> Result<CommitResult, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Put {
            path: path.to_string(),
            message: message.to_string(),
            revision: revision.map(|r| r.to_string()),
        });

        let current = state.files.get(path).map(|(_, r)| r.clone());
        match (current, revision) {
            (Some(_), None) => {
                return Err(StoreError::Rejected {
                    status: 422,
                    message: "\"sha\" wasn't supplied.".to_string(),
                })
            }
            (Some(current), Some(given)) if &current != given => {
                return Err(StoreError::Rejected {
                    status: 409,
                    message: format!("{path} does not match {given}"),
                })
            }
            _ => {}
        }

        let n = state.bump();
        let new_revision = RevisionSha::new(format!("rev-{n}")).unwrap();
        state
            .files
            .insert(path.clone(), (content.to_string(), new_revision.clone()));
        Ok(CommitResult {
            path: path.clone(),
            revision: new_revision,
            commit: CommitSha::new(format!("commit-{n}")).unwrap(),
            html_url: None,
        })
    }

    async fn list_files(&self, dir: &ContentPath) -> Result<Vec<FileEntry>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::List {
            dir: dir.to_string(),
        });
        if state.fail_listing {
            return Err(server_error("listing unavailable"));
        }

        let prefix = format!("{dir}/");
        let mut entries: Vec<FileEntry> = Vec::new();
        let mut seen_dirs = HashSet::new();
        for (path, (_, revision)) in &state.files {
            let Some(rest) = path.as_str().strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                None => entries.push(FileEntry {
                    name: rest.to_string(),
                    path: path.clone(),
                    revision: revision.clone(),
                    kind: EntryKind::File,
                }),
                Some((sub, _)) => {
                    if seen_dirs.insert(sub.to_string()) {
                        entries.push(FileEntry {
                            name: sub.to_string(),
                            path: dir.join(sub).unwrap(),
                            revision: RevisionSha::new(format!("tree-{sub}")).unwrap(),
                            kind: EntryKind::Dir,
                        });
                    }
                }
            }
        }

        if entries.is_empty() {
            return Err(StoreError::NotFound { path: dir.clone() });
        }
        Ok(entries)
    }

    async fn delete_file(
        &self,
        path: &ContentPath,
        revision: &RevisionSha,
        message: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Delete {
            path: path.to_string(),
            revision: revision.to_string(),
            message: message.to_string(),
        });
        if state.fail_deletes.contains(path) {
            return Err(server_error("delete refused"));
        }
        let current = state.files.get(path).map(|(_, r)| r.clone());
        match current {
            None => Err(StoreError::NotFound { path: path.clone() }),
            Some(current) if &current != revision => Err(StoreError::Rejected {
                status: 409,
                message: format!("{path} does not match {revision}"),
            }),
            Some(_) => {
                state.files.remove(path);
                Ok(())
            }
        }
    }
}
