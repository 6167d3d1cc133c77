//! Configuration file discovery, parsing and environment overrides.
//!
//! Precedence, highest first: environment variables, the file given with
//! `--config` (or `CHAT_MEMORY_CONFIG`), `{config_dir}/chat-memory/config.toml`,
//! built-in defaults.
//!
//! ```toml
//! [github]
//! owner = "octocat"
//! repo = "chat-notes"
//! branch = "main"
//!
//! [triggers]
//! memory = "記憶保存お願いします"
//! summary = "サマリー保存お願いします"
//!
//! [telemetry]
//! format = "pretty"
//! ```

use std::path::{Path, PathBuf};

use github::GithubConfig;
use memory::TriggerPhrases;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::telemetry::TelemetryConfig;

/// Environment variables that override file settings.
pub mod env {
    pub const TOKEN: &str = "CHAT_MEMORY_GITHUB_TOKEN";
    /// Read when [`TOKEN`] is unset.
    pub const GENERIC_TOKEN: &str = "GITHUB_TOKEN";
    pub const OWNER: &str = "CHAT_MEMORY_GITHUB_OWNER";
    pub const REPO: &str = "CHAT_MEMORY_GITHUB_REPO";
    pub const BRANCH: &str = "CHAT_MEMORY_GITHUB_BRANCH";
    pub const OTLP_ENDPOINT: &str = "CHAT_MEMORY_OTLP_ENDPOINT";
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Everything the binary needs, as loaded from file and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GithubConfig,
    pub triggers: TriggerPhrases,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Parses a TOML document.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(env::TOKEN).or_else(|| get(env::GENERIC_TOKEN)) {
            self.github.token = token;
        }
        if let Some(owner) = get(env::OWNER) {
            self.github.owner = owner;
        }
        if let Some(repo) = get(env::REPO) {
            self.github.repo = repo;
        }
        if let Some(branch) = get(env::BRANCH) {
            self.github.branch = branch;
        }
        if let Some(endpoint) = get(env::OTLP_ENDPOINT) {
            self.telemetry.otlp_endpoint = Some(endpoint);
        }
    }

    /// A copy safe to print, with the token masked.
    pub fn redacted(&self) -> Self {
        Self {
            github: self.github.redacted(),
            ..self.clone()
        }
    }
}

/// The default config file location, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chat-memory").join("config.toml"))
}

/// Loads the configuration.
///
/// An explicit path must exist. The default path is used only if present.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match explicit {
        Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
        Some(p) => Some(p.to_path_buf()),
        None => default_path().filter(|p| p.exists()),
    };

    let mut config = match path {
        None => AppConfig::default(),
        Some(path) => {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            AppConfig::from_toml(&content, &path)?
        }
    };
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use crate::telemetry::LogFormat;

    #[test]
    fn parses_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[github]
token = "ghp_fromfile000000"
owner = "octocat"
repo = "chat-notes"
branch = "archive"

[triggers]
memory = "save it"

[telemetry]
format = "pretty"
otlp_endpoint = "http://localhost:4317"
"#
        )
        .unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let config = AppConfig::from_toml(&content, file.path()).unwrap();
        assert_eq!(config.github.owner, "octocat");
        assert_eq!(config.github.branch, "archive");
        assert_eq!(config.github.api_base, github::DEFAULT_API_BASE);
        assert_eq!(config.triggers.memory, "save it");
        assert_eq!(config.triggers.summary, memory::trigger::DEFAULT_SUMMARY_TRIGGER);
        assert_eq!(config.telemetry.format, LogFormat::Pretty);
        assert_eq!(
            config.telemetry.otlp_endpoint.as_deref(),
            Some("http://localhost:4317")
        );
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("", Path::new("x.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.telemetry.format, LogFormat::Json);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let err = AppConfig::from_toml("[github\n", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn environment_overrides_file() {
        let vars: HashMap<&str, &str> = [
            (env::GENERIC_TOKEN, "ghp_generic"),
            (env::OWNER, "envowner"),
            (env::REPO, ""),
            (env::BRANCH, "archive"),
            (env::OTLP_ENDPOINT, "http://collector:4317"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.github.repo = "filerepo".to_string();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.github.token, "ghp_generic");
        assert_eq!(config.github.owner, "envowner");
        assert_eq!(config.github.repo, "filerepo");
        assert_eq!(config.github.branch, "archive");
        assert_eq!(
            config.telemetry.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
    }

    #[test]
    fn specific_token_variable_wins() {
        let mut config = AppConfig::default();
        config.apply_env(|k| match k {
            env::TOKEN => Some("specific".to_string()),
            env::GENERIC_TOKEN => Some("generic".to_string()),
            _ => None,
        });
        assert_eq!(config.github.token, "specific");
    }

    #[test]
    fn redacted_config_hides_token() {
        let mut config = AppConfig::default();
        config.github.token = "ghp_0123456789abcdef".to_string();
        let printed = toml::to_string(&config.redacted()).unwrap();
        assert!(!printed.contains("ghp_0123456789abcdef"));
        assert!(printed.contains("***cdef"));
    }
}
