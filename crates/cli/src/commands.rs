//! Save commands, independent of argument parsing and process I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use memory::{
    CommitResult, ContentStore, InvalidSessionId, MemorySaveReport, MemoryWriter, Redactor, SessionId,
    SummaryWriter, Transcript, TranscriptError, Trigger, TriggerPhrases, WriteError,
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error("Input is not a JSON array of strings: {0}")]
    InvalidTranscript(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidSessionId(#[from] InvalidSessionId),

    #[error("Memory content is empty")]
    EmptyMemory,

    #[error("Memory trigger matched but no conversation was supplied")]
    MissingConversation,
}

/// Input for a memory save.
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    /// A JSON array of message strings, or Markdown when `raw` is set.
    pub text: String,
    pub raw: bool,
    pub session_id: Option<String>,
    /// Chat page URL the session id is extracted from.
    pub url: Option<String>,
}

/// Result of running a prompt through the trigger classifier.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PromptOutcome {
    Memory(MemorySaveReport),
    Summary(CommitResult),
    NoTrigger,
}

/// The writers and trigger phrases wired to one store.
pub struct App {
    memory: MemoryWriter,
    summary: SummaryWriter,
    triggers: TriggerPhrases,
}

impl App {
    pub fn new(store: Arc<dyn ContentStore>, redactor: Redactor, triggers: TriggerPhrases) -> Self {
        Self {
            memory: MemoryWriter::new(Arc::clone(&store)).with_redactor(redactor.clone()),
            summary: SummaryWriter::new(store).with_redactor(redactor),
            triggers,
        }
    }

    /// Builds the memory document from `input` and saves it.
    pub async fn save_memory(
        &self,
        input: &MemoryInput,
        now: DateTime<Utc>,
    ) -> Result<MemorySaveReport, CommandError> {
        let session = SessionId::resolve(input.session_id.as_deref(), input.url.as_deref(), now)?;
        let content = if input.raw {
            if input.text.trim().is_empty() {
                return Err(CommandError::EmptyMemory);
            }
            input.text.clone()
        } else {
            let messages: Vec<String> = serde_json::from_str(&input.text)?;
            Transcript::new(messages, now)?.to_markdown()
        };

        Ok(self
            .memory
            .save_memory_at(&content, session.as_ref(), now)
            .await?)
    }

    pub async fn save_summary(&self, text: &str) -> Result<CommitResult, CommandError> {
        Ok(self.summary.save_summary(text).await?)
    }

    /// Classifies `prompt` and performs the save it asks for.
    ///
    /// `input` carries the conversation for a memory trigger and the
    /// fallback summary text when nothing follows the summary phrase.
    pub async fn prompt(
        &self,
        prompt: &str,
        url: Option<&str>,
        input: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PromptOutcome, CommandError> {
        match self.triggers.classify(prompt) {
            None => {
                info!("Prompt matched no trigger");
                Ok(PromptOutcome::NoTrigger)
            }
            Some(Trigger::SaveMemory) => {
                let text = input.ok_or(CommandError::MissingConversation)?;
                let input = MemoryInput {
                    text: text.to_string(),
                    raw: false,
                    session_id: None,
                    url: url.map(str::to_string),
                };
                self.save_memory(&input, now).await.map(PromptOutcome::Memory)
            }
            Some(Trigger::SaveSummary { body }) => {
                let text = if body.is_empty() {
                    input.unwrap_or_default()
                } else {
                    body.as_str()
                };
                self.save_summary(text).await.map(PromptOutcome::Summary)
            }
        }
    }
}
