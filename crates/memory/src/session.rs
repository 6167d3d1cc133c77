//! Deriving a [`SessionId`] from what the producer knows about the chat.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{InvalidSessionId, SessionId};

static CHAT_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/chat/([A-Za-z0-9-]+)").expect("chat pattern is valid"));

impl SessionId {
    /// Extracts the chat id from a URL or path containing `/chat/{id}`.
    ///
    /// Only the first match is used, and only `[A-Za-z0-9-]` characters are
    /// taken, so query strings and fragments are ignored.
    pub fn from_chat_url(url: &str) -> Option<Self> {
        let captures = CHAT_SEGMENT.captures(url)?;
        Self::new(captures.get(1)?.as_str())
    }

    /// Picks the session id for a save.
    ///
    /// An explicit id wins, then an id found in `url`. When a URL was given
    /// but holds no chat id, a [`SessionId::fallback`] is generated from
    /// `now`. With neither, the result is `None` and the writer files the
    /// save under `unknown`.
    ///
    /// A blank explicit id counts as absent. A non-blank one that is not a
    /// valid id is an error rather than a silent `unknown`.
    pub fn resolve(
        explicit: Option<&str>,
        url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, InvalidSessionId> {
        if let Some(value) = explicit.filter(|v| !v.trim().is_empty()) {
            return Self::new(value).map(Some).ok_or_else(|| InvalidSessionId {
                value: value.to_string(),
            });
        }
        let Some(url) = url else {
            return Ok(None);
        };
        Ok(Some(
            Self::from_chat_url(url).unwrap_or_else(|| Self::fallback(now)),
        ))
    }
}
