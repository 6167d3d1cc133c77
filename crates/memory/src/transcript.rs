//! Rendering the visible conversation as Markdown.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Separator placed between consecutive messages.
pub const MESSAGE_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// Every message was empty after trimming.
    #[error("Conversation has no messages")]
    Empty,
}

/// The messages of one conversation captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<String>,
    captured_at: DateTime<Utc>,
}

impl Transcript {
    /// Builds a transcript, dropping messages that are empty after trimming.
    pub fn new<I, S>(messages: I, captured_at: DateTime<Utc>) -> Result<Self, TranscriptError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let messages: Vec<String> = messages
            .into_iter()
            .map(|m| m.as_ref().trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if messages.is_empty() {
            return Err(TranscriptError::Empty);
        }
        Ok(Self {
            messages,
            captured_at,
        })
    }

    /// Number of non-empty messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always `false` for a successfully built transcript.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Renders the transcript: a heading with the capture time, then the
    /// messages separated by horizontal rules.
    pub fn to_markdown(&self) -> String {
        format!(
            "# Conversation {} UTC\n\n{}",
            self.captured_at.format("%Y-%m-%d %H:%M:%S"),
            self.messages.join(MESSAGE_SEPARATOR)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn renders_heading_and_separators() {
        let t = Transcript::new(["  hi  ", "", "hello\nthere", "\n"], at()).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.to_markdown(),
            "# Conversation 2024-05-06 07:08:09 UTC\n\nhi\n\n---\n\nhello\nthere"
        );
    }

    #[test]
    fn all_blank_is_empty() {
        let err = Transcript::new(vec!["", "  "], at()).unwrap_err();
        assert_eq!(err, TranscriptError::Empty);
        assert!(Transcript::new(Vec::<String>::new(), at()).is_err());
    }
}
