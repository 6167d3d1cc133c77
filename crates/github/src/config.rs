//! Connection settings for the GitHub Contents API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Branch written to when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Values shipped in sample configs that are not real credentials.
const PLACEHOLDER_TOKENS: &[&str] = &["REPLACE_WITH_GITHUB_TOKEN", "undefined", "null"];

/// Errors detected while validating a [`GithubConfig`] or building its client.
#[derive(Debug, Error)]
pub enum GithubConfigError {
    /// No token was configured, or the configured value is a placeholder.
    #[error("GitHub token is missing or still a placeholder")]
    MissingToken,

    /// A required field is empty or malformed.
    #[error("Invalid GitHub {field}: {value:?}")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// `api_base` is not an absolute http(s) URL.
    #[error("Invalid API base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("Could not build HTTP client: {0}")]
    Client(String),
}

/// Which repository and branch to write to, and how to authenticate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token sent as a bearer credential.
    #[serde(default)]
    pub token: String,
    /// Repository owner (user or organisation).
    #[serde(default)]
    pub owner: String,
    /// Repository name.
    #[serde(default)]
    pub repo: String,
    /// Branch every read and write targets.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// REST API root, overridable for GitHub Enterprise.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.masked_token())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GithubConfig {
    /// Creates a config for `owner/repo` on the default branch.
    pub fn new(token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    /// Sets the branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Sets the API root.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Returns `true` when a token is set and is not a known placeholder.
    pub fn has_token(&self) -> bool {
        let token = self.token.trim();
        !token.is_empty() && !PLACEHOLDER_TOKENS.contains(&token)
    }

    /// The token with all but its last four characters hidden.
    ///
    /// Short or placeholder tokens are hidden entirely.
    pub fn masked_token(&self) -> String {
        if !self.has_token() {
            return "<missing>".to_string();
        }
        let chars: Vec<char> = self.token.trim().chars().collect();
        if chars.len() < 12 {
            return "***".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("***{tail}")
    }

    /// A copy safe to print: the token is replaced by [`Self::masked_token`].
    pub fn redacted(&self) -> Self {
        Self {
            token: self.masked_token(),
            ..self.clone()
        }
    }

    /// Checks every field needed to talk to the API.
    pub fn validate(&self) -> Result<(), GithubConfigError> {
        if !self.has_token() {
            return Err(GithubConfigError::MissingToken);
        }
        for (field, value) in [("owner", &self.owner), ("repo", &self.repo)] {
            if value.trim().is_empty() || value.contains('/') {
                return Err(GithubConfigError::InvalidField {
                    field,
                    value: value.clone(),
                });
            }
        }
        if self.branch.trim().is_empty() {
            return Err(GithubConfigError::InvalidField {
                field: "branch",
                value: self.branch.clone(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(GithubConfigError::InvalidField {
                field: "timeout_secs",
                value: self.timeout_secs.to_string(),
            });
        }
        Ok(())
    }
}
