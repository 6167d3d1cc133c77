//! Trigger phrases typed into a chat prompt box.

use serde::{Deserialize, Serialize};

/// Default phrase requesting a memory save.
pub const DEFAULT_MEMORY_TRIGGER: &str = "記憶保存お願いします";

/// Default phrase requesting a summary save.
pub const DEFAULT_SUMMARY_TRIGGER: &str = "サマリー保存お願いします";

/// The pair of phrases a producer watches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerPhrases {
    /// Must equal the whole prompt to request a memory save.
    pub memory: String,
    /// Must start the prompt; the rest becomes the summary body.
    pub summary: String,
}

impl Default for TriggerPhrases {
    fn default() -> Self {
        Self {
            memory: DEFAULT_MEMORY_TRIGGER.to_string(),
            summary: DEFAULT_SUMMARY_TRIGGER.to_string(),
        }
    }
}

/// What a matched prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Save the visible conversation.
    SaveMemory,
    /// Save a summary; `body` is the text typed after the phrase, possibly empty.
    SaveSummary { body: String },
}

impl TriggerPhrases {
    /// Classifies a prompt.
    ///
    /// The memory phrase must be the whole (trimmed) prompt. The summary
    /// phrase must start it; whatever follows becomes the summary body.
    pub fn classify(&self, prompt: &str) -> Option<Trigger> {
        let prompt = prompt.trim();
        let memory = self.memory.trim();
        let summary = self.summary.trim();

        if !memory.is_empty() && prompt == memory {
            return Some(Trigger::SaveMemory);
        }
        if summary.is_empty() {
            return None;
        }
        prompt.strip_prefix(summary).map(|rest| Trigger::SaveSummary {
            body: rest.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_phrase_must_match_whole_prompt() {
        let phrases = TriggerPhrases::default();
        assert_eq!(
            phrases.classify("  記憶保存お願いします\n"),
            Some(Trigger::SaveMemory)
        );
        assert_eq!(phrases.classify("記憶保存お願いします！"), None);
        assert_eq!(phrases.classify("ねえ 記憶保存お願いします"), None);
    }

    #[test]
    fn summary_phrase_carries_body() {
        let phrases = TriggerPhrases::default();
        assert_eq!(
            phrases.classify("サマリー保存お願いします\n今日は設計を決めた。"),
            Some(Trigger::SaveSummary {
                body: "今日は設計を決めた。".to_string()
            })
        );
        assert_eq!(
            phrases.classify("サマリー保存お願いします"),
            Some(Trigger::SaveSummary {
                body: String::new()
            })
        );
    }

    #[test]
    fn empty_phrases_never_match() {
        let phrases = TriggerPhrases {
            memory: String::new(),
            summary: "  ".to_string(),
        };
        assert_eq!(phrases.classify(""), None);
        assert_eq!(phrases.classify("anything"), None);
    }

    #[test]
    fn unrelated_prompt() {
        assert_eq!(TriggerPhrases::default().classify("hello"), None);
    }
}
