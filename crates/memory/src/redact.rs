//! Credential redaction applied to content before it is persisted.

use std::sync::LazyLock;

use regex::Regex;

/// Replacement written in place of every removed credential.
pub const REDACTION_MARKER: &str = "[TOKEN_REMOVED]";

// Classic tokens (ghp_, gho_, ghu_, ghs_, ghr_) and fine-grained PATs.
static GITHUB_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"gh[pousr]_[A-Za-z0-9]{36}|github_pat_[A-Za-z0-9]{22}_[A-Za-z0-9]{59}")
        .expect("token pattern is valid")
});

/// Removes credential-shaped substrings from text.
///
/// Always removes GitHub token shapes. Extra literal secrets (such as the
/// token the process itself authenticates with) can be registered so they
/// are removed even when they do not match a known shape.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    literals: Vec<String>,
}

impl Redactor {
    /// Creates a redactor that removes only known token shapes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a literal secret. Empty strings are ignored.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.literals.push(secret);
        }
        self
    }

    /// Returns the redacted text and the number of replacements made.
    pub fn redact(&self, content: &str) -> (String, usize) {
        let mut count = 0;
        let mut out = content.to_string();
        for literal in &self.literals {
            let hits = out.matches(literal.as_str()).count();
            if hits > 0 {
                count += hits;
                out = out.replace(literal.as_str(), REDACTION_MARKER);
            }
        }

        let hits = GITHUB_TOKEN.find_iter(&out).count();
        if hits > 0 {
            count += hits;
            out = GITHUB_TOKEN.replace_all(&out, REDACTION_MARKER).into_owned();
        }
        (out, count)
    }
}
