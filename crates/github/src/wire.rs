//! Request and response bodies of the GitHub Contents API, and their
//! translation into `memory` types.
//!
//! Decoding works on the raw response text so every mapping here can be
//! exercised without a server.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use memory::{
    CommitResult, CommitSha, ContentPath, EntryKind, FileEntry, RemoteFile, RevisionSha,
    StoreError,
};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct PutRequest<'a> {
    pub message: &'a str,
    /// Base64 of the UTF-8 content.
    pub content: String,
    pub branch: &'a str,
    /// Current blob SHA; omitted when creating the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

impl<'a> PutRequest<'a> {
    pub fn new(content: &str, message: &'a str, branch: &'a str, sha: Option<&'a str>) -> Self {
        Self {
            message,
            content: STANDARD.encode(content.as_bytes()),
            branch,
            sha,
        }
    }
}

/// Body of `DELETE /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    pub branch: &'a str,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// One content object, as returned for a file or inside a directory listing.
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
    /// Present on single-file reads only.
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: ContentItem,
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::InvalidResponse {
        message: message.into(),
    }
}

fn parse<'de, T: Deserialize<'de>>(body: &'de str, what: &str) -> Result<T, StoreError> {
    serde_json::from_str(body).map_err(|e| invalid(format!("{what}: {e}")))
}

fn content_path(raw: String) -> Result<ContentPath, StoreError> {
    ContentPath::new(raw.clone()).ok_or_else(|| invalid(format!("unusable path {raw:?}")))
}

fn revision(raw: String) -> Result<RevisionSha, StoreError> {
    RevisionSha::new(raw).ok_or_else(|| invalid("empty sha"))
}

fn entry_kind(raw: &str) -> EntryKind {
    match raw {
        "file" => EntryKind::File,
        "dir" => EntryKind::Dir,
        _ => EntryKind::Other,
    }
}

/// Decodes a single-file read.
///
/// GitHub omits the inline content of files above 1 MB (`encoding: "none"`);
/// those decode to an empty `content` with a valid revision.
pub(crate) fn decode_file(body: &str) -> Result<RemoteFile, StoreError> {
    let item: ContentItem = parse(body, "file metadata")?;
    if item.kind != "file" {
        return Err(invalid(format!("{} is a {}, not a file", item.path, item.kind)));
    }

    let content = match (item.encoding.as_deref(), item.content) {
        (Some("base64"), Some(encoded)) => {
            let compact: String = encoded.split_whitespace().collect();
            let bytes = STANDARD
                .decode(compact)
                .map_err(|e| invalid(format!("file content: {e}")))?;
            String::from_utf8(bytes).map_err(|e| invalid(format!("file content: {e}")))?
        }
        _ => String::new(),
    };

    Ok(RemoteFile {
        path: content_path(item.path)?,
        content,
        revision: revision(item.sha)?,
    })
}

/// Decodes a directory listing. A single object (the path is a file) is an
/// invalid response.
pub(crate) fn decode_listing(body: &str) -> Result<Vec<FileEntry>, StoreError> {
    let items: Vec<ContentItem> = parse(body, "directory listing")?;
    items
        .into_iter()
        .map(|item| -> Result<FileEntry, StoreError> {
            Ok(FileEntry {
                kind: entry_kind(&item.kind),
                name: item.name,
                path: content_path(item.path)?,
                revision: revision(item.sha)?,
            })
        })
        .collect()
}

/// Decodes the response of a create-or-update.
pub(crate) fn decode_commit(body: &str) -> Result<CommitResult, StoreError> {
    let response: PutResponse = parse(body, "commit response")?;
    Ok(CommitResult {
        path: content_path(response.content.path)?,
        revision: revision(response.content.sha)?,
        commit: CommitSha::new(response.commit.sha).ok_or_else(|| invalid("empty commit sha"))?,
        html_url: response.commit.html_url,
    })
}

/// Builds the error for a non-success status.
///
/// Uses the JSON `message` field when present, else the raw body, else the
/// status reason.
pub(crate) fn rejection(status: u16, reason: &str, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let raw = body.trim();
            if raw.is_empty() {
                reason.to_string()
            } else {
                raw.to_string()
            }
        });
    StoreError::Rejected { status, message }
}
