//! End-to-end behaviour of the memory and summary writers against the
//! in-memory content store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use memory::fakes::{InMemoryContentStore, StoreCall};
use memory::{
    CommitResult, ContentPath, ContentStore, FileEntry, MemoryWriter, Redactor, RemoteFile,
    RevisionSha, SessionId, StoreError, SummaryWriter, WriteError,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()
}

fn sid(s: &str) -> SessionId {
    SessionId::new(s).unwrap()
}

fn path(s: &str) -> ContentPath {
    ContentPath::new(s).unwrap()
}

fn writer(store: &Arc<InMemoryContentStore>) -> MemoryWriter {
    MemoryWriter::new(store.clone() as Arc<dyn ContentStore>)
}

#[tokio::test]
async fn stored_content_never_contains_tokens() {
    let store = Arc::new(InMemoryContentStore::new());
    let token = format!("ghp_{}", "Z9".repeat(18));
    let content = format!("my token is {token} ok");

    let report = writer(&store)
        .save_memory_at(&content, Some(&sid("abc")), day(6))
        .await
        .unwrap();

    let stored = store.content("memories/2024-05/2024-05-06_abc.md").unwrap();
    assert!(!stored.contains(&token));
    assert_eq!(stored, "my token is [TOKEN_REMOVED] ok");
    assert_eq!(report.redactions, 1);
}

#[tokio::test]
async fn registered_secret_is_removed() {
    let store = Arc::new(InMemoryContentStore::new());
    let w = writer(&store).with_redactor(Redactor::new().with_secret("s3cr3t-value"));

    w.save_memory_at("leak s3cr3t-value", Some(&sid("abc")), day(6))
        .await
        .unwrap();

    let stored = store.content("memories/2024-05/2024-05-06_abc.md").unwrap();
    assert_eq!(stored, "leak [TOKEN_REMOVED]");
}

#[tokio::test]
async fn same_day_saves_overwrite_one_file() {
    let store = Arc::new(InMemoryContentStore::new());
    let w = writer(&store);

    w.save_memory_at("first", Some(&sid("abc")), day(6))
        .await
        .unwrap();
    let report = w
        .save_memory_at("second", Some(&sid("abc")), day(6))
        .await
        .unwrap();

    assert_eq!(store.paths(), vec!["memories/2024-05/2024-05-06_abc.md"]);
    assert_eq!(
        store.content("memories/2024-05/2024-05-06_abc.md").as_deref(),
        Some("second")
    );
    assert!(report.cleanup.deleted.is_empty());
    assert!(report.cleanup.is_clean());
}

#[tokio::test]
async fn new_day_supersedes_previous_file_of_same_session_only() {
    let store = Arc::new(InMemoryContentStore::new());
    store.insert(&path("memories/2024-05/2024-05-01_other.md"), "other");
    store.insert(&path("memories/2024-05/2024-05-01_x_abc.md"), "lookalike");
    let w = writer(&store);

    w.save_memory_at("monday", Some(&sid("abc")), day(6))
        .await
        .unwrap();
    let report = w
        .save_memory_at("tuesday", Some(&sid("abc")), day(7))
        .await
        .unwrap();

    assert_eq!(
        report.cleanup.deleted,
        vec![path("memories/2024-05/2024-05-06_abc.md")]
    );
    assert_eq!(
        store.paths(),
        vec![
            "memories/2024-05/2024-05-01_other.md",
            "memories/2024-05/2024-05-01_x_abc.md",
            "memories/2024-05/2024-05-07_abc.md",
        ]
    );
    assert_eq!(report.commit.path, path("memories/2024-05/2024-05-07_abc.md"));

    let delete = store
        .calls()
        .into_iter()
        .find(|c| matches!(c, StoreCall::Delete { .. }))
        .unwrap();
    match delete {
        StoreCall::Delete { message, .. } => assert!(message.contains("2024-05-06_abc.md")),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn missing_session_files_under_unknown() {
    let store = Arc::new(InMemoryContentStore::new());
    let report = writer(&store)
        .save_memory_at("text", None, day(6))
        .await
        .unwrap();
    assert!(report.commit.path.as_str().ends_with("_unknown.md"));
}

#[tokio::test]
async fn put_carries_revision_only_when_file_exists() {
    let store = Arc::new(InMemoryContentStore::new());
    let w = writer(&store);

    w.save_memory_at("one", Some(&sid("abc")), day(6))
        .await
        .unwrap();
    let existing = store.insert(&path("memories/2024-05/2024-05-06_abc.md"), "seeded");
    w.save_memory_at("two", Some(&sid("abc")), day(6))
        .await
        .unwrap();

    let revisions: Vec<Option<String>> = store
        .puts()
        .into_iter()
        .map(|c| match c {
            StoreCall::Put { revision, .. } => revision,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(revisions, vec![None, Some(existing.to_string())]);
}

#[tokio::test]
async fn commit_message_embeds_the_date() {
    let store = Arc::new(InMemoryContentStore::new());
    writer(&store)
        .save_memory_at("text", Some(&sid("abc")), day(6))
        .await
        .unwrap();
    match &store.puts()[0] {
        StoreCall::Put { message, .. } => assert!(message.contains("2024-05-06")),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn listing_failure_is_reported_and_save_continues() {
    let store = Arc::new(InMemoryContentStore::new());
    store.insert(&path("memories/2024-05/2024-05-01_abc.md"), "old");
    store.fail_listing();

    let report = writer(&store)
        .save_memory_at("new", Some(&sid("abc")), day(6))
        .await
        .unwrap();

    assert_eq!(report.cleanup.failures.len(), 1);
    assert!(report.cleanup.failures[0].path.is_none());
    assert!(store.content("memories/2024-05/2024-05-06_abc.md").is_some());
    assert!(store.content("memories/2024-05/2024-05-01_abc.md").is_some());
}

#[tokio::test]
async fn delete_failure_is_reported_and_save_continues() {
    let store = Arc::new(InMemoryContentStore::new());
    let stuck = path("memories/2024-05/2024-05-01_abc.md");
    store.insert(&stuck, "old");
    store.insert(&path("memories/2024-05/2024-05-02_abc.md"), "older");
    store.fail_delete(&stuck);

    let report = writer(&store)
        .save_memory_at("new", Some(&sid("abc")), day(6))
        .await
        .unwrap();

    assert_eq!(
        report.cleanup.deleted,
        vec![path("memories/2024-05/2024-05-02_abc.md")]
    );
    assert_eq!(report.cleanup.failures.len(), 1);
    assert_eq!(report.cleanup.failures[0].path.as_ref(), Some(&stuck));
    assert!(store.content("memories/2024-05/2024-05-06_abc.md").is_some());
}

/// Reports a revision that never matches, as if another writer got there first.
struct StaleReads(InMemoryContentStore);

#[async_trait]
impl ContentStore for StaleReads {
    async fn get_file(&self, path: &ContentPath) -> Result<RemoteFile, StoreError> {
        let mut file = self.0.get_file(path).await?;
        file.revision = RevisionSha::new("stale").unwrap();
        Ok(file)
    }

    async fn put_file(
        &self,
        path: &ContentPath,
        content: &str,
        message: &str,
        revision: Option<&RevisionSha>,
    ) -> Result<CommitResult, StoreError> {
        self.0.put_file(path, content, message, revision).await
    }

    async fn list_files(&self, dir: &ContentPath) -> Result<Vec<FileEntry>, StoreError> {
        self.0.list_files(dir).await
    }

    async fn delete_file(
        &self,
        path: &ContentPath,
        revision: &RevisionSha,
        message: &str,
    ) -> Result<(), StoreError> {
        self.0.delete_file(path, revision, message).await
    }
}

#[tokio::test]
async fn stale_revision_is_propagated_without_retry() {
    let inner = InMemoryContentStore::new();
    inner.insert(&path("summary.md"), "old");
    let store = Arc::new(StaleReads(inner));

    let err = SummaryWriter::new(store.clone())
        .save_summary("new")
        .await
        .unwrap_err();

    match err {
        WriteError::Store(e) => assert!(e.is_conflict(), "{e}"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(store.0.puts().len(), 1);
    assert_eq!(store.0.content("summary.md").as_deref(), Some("old"));
}

#[tokio::test]
async fn summary_always_targets_summary_md() {
    let store = Arc::new(InMemoryContentStore::new());
    let w = SummaryWriter::new(store.clone() as Arc<dyn ContentStore>);

    let first = w.save_summary("v1").await.unwrap();
    let second = w.save_summary("  v2\n").await.unwrap();

    assert_eq!(first.path.as_str(), "summary.md");
    assert_eq!(second.path.as_str(), "summary.md");
    assert_eq!(store.paths(), vec!["summary.md"]);
    assert_eq!(store.content("summary.md").as_deref(), Some("v2"));

    let revisions: Vec<Option<String>> = store
        .puts()
        .into_iter()
        .map(|c| match c {
            StoreCall::Put { revision, .. } => revision,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(revisions, vec![None, Some(first.revision.to_string())]);
}

#[tokio::test]
async fn empty_summary_is_rejected_before_any_store_call() {
    let store = Arc::new(InMemoryContentStore::new());
    let err = SummaryWriter::new(store.clone() as Arc<dyn ContentStore>)
        .save_summary(" \n\t ")
        .await
        .unwrap_err();
    assert!(matches!(err, WriteError::EmptySummary));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn concurrent_saves_for_one_session_leave_one_file() {
    let store = Arc::new(InMemoryContentStore::new());
    let w = Arc::new(writer(&store));
    let session = sid("abc");

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let w = Arc::clone(&w);
            let session = session.clone();
            tokio::spawn(async move {
                w.save_memory_at(&format!("save {i}"), Some(&session), day(6))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.paths(), vec!["memories/2024-05/2024-05-06_abc.md"]);
}
