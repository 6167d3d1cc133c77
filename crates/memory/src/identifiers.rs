//! Newtype domain identifiers.
//!
//! Every string the save protocol passes around has a distinct purpose: a
//! session id is not a path, and a content revision is not a commit SHA. Each
//! one is a separate newtype so they cannot be interchanged by accident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Store-assigned identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// Opaque version marker of a stored file.
    ///
    /// The content store requires the current revision to accept an overwrite
    /// or a delete. For GitHub this is the blob SHA of the file.
    RevisionSha
}

string_id! {
    /// SHA of the commit produced by a write or delete.
    CommitSha
}

// ---------------------------------------------------------------------------
// Session identifiers
// ---------------------------------------------------------------------------

/// Prefix of generated session ids when no chat URL is available.
pub const FALLBACK_SESSION_PREFIX: &str = "session_";

/// Placeholder used in filenames when a save carries no session id at all.
pub const UNKNOWN_SESSION: &str = "unknown";

/// Groups conversation saves belonging to one chat thread.
///
/// Session ids end up inside filenames, so they must be non-empty and must
/// not contain a path separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id, returning `None` if the value is empty, only
    /// whitespace, or contains `/`.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let v = v.trim();
        if v.is_empty() || v.contains('/') {
            None
        } else {
            Some(Self(v.to_string()))
        }
    }

    /// The placeholder session used when the producer supplied none.
    pub fn unknown() -> Self {
        Self(UNKNOWN_SESSION.to_string())
    }

    /// Generates a `session_{unix_millis}` id for chats with no URL-derived id.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self(format!("{FALLBACK_SESSION_PREFIX}{}", now.timestamp_millis()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// A file or directory path relative to the root of the content store.
///
/// Always `/`-separated, with no leading or trailing separator and no empty
/// segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentPath(String);

impl ContentPath {
    /// Creates a path, returning `None` if it is empty, starts or ends with
    /// `/`, or contains an empty segment.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() || v.split('/').any(str::is_empty) {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Wraps a path literal known to be well-formed.
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(Self::new(value).is_some(), "malformed path literal {value}");
        Self(value.to_string())
    }

    /// Appends a single segment to this path.
    ///
    /// Returns `None` if `name` is empty or contains `/`.
    pub fn join(&self, name: &str) -> Option<Self> {
        if name.is_empty() || name.contains('/') {
            None
        } else {
            Some(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// The last segment of the path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The path segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
