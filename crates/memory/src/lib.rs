//! Chat memory persistence domain.
//!
//! Stores chat conversations as dated, session-scoped Markdown files in a
//! remote version-controlled content store, superseding earlier files of the
//! same session, and keeps a single overwritten `summary.md` next to them.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no network
//! dependencies. It defines the [`ContentStore`] port; the `github` crate
//! implements it over the GitHub Contents REST API.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtypes (`SessionId`, `ContentPath`, `RevisionSha`, ...) |
//! | [`types`] | Store records and save reports |
//! | [`errors`] | `StoreError` and `WriteError` |
//! | [`store`] | The `ContentStore` trait |
//! | [`layout`] | Memory and summary paths |
//! | [`redact`] | Credential redaction |
//! | [`writer`] | `MemoryWriter` and `SummaryWriter` |
//! | [`session`] | Session ids from chat URLs |
//! | [`trigger`] | Trigger-phrase classification |
//! | [`transcript`] | Conversation rendering |
//! | [`fakes`] | In-memory `ContentStore` for tests |

pub mod errors;
pub mod fakes;
pub mod identifiers;
pub mod layout;
pub mod redact;
pub mod session;
pub mod store;
pub mod transcript;
pub mod trigger;
pub mod types;
pub mod writer;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{InvalidSessionId, StoreError, WriteError};
pub use identifiers::{
    CommitSha, ContentPath, RevisionSha, SessionId, FALLBACK_SESSION_PREFIX,
    UNKNOWN_SESSION,
};
pub use layout::{MemoryTarget, MEMORIES_ROOT, SUMMARY_FILE};
pub use redact::{Redactor, REDACTION_MARKER};
pub use store::ContentStore;
pub use transcript::{Transcript, TranscriptError};
pub use trigger::{Trigger, TriggerPhrases};
pub use types::{
    CleanupFailure, CleanupReport, CommitResult, EntryKind, FileEntry, MemorySaveReport,
    RemoteFile, StoredFile,
};
pub use writer::{MemoryWriter, SummaryWriter};
