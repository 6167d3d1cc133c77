//! [`ContentStore`] over `https://api.github.com/repos/{owner}/{repo}/contents`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use tracing::{debug, instrument};

use memory::{
    CommitResult, ContentPath, ContentStore, FileEntry, RemoteFile, RevisionSha, StoreError,
};

use crate::config::{GithubConfig, GithubConfigError};
use crate::wire::{self, DeleteRequest, PutRequest};

const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("chat-memory/", env!("CARGO_PKG_VERSION"));

/// GitHub-backed content store for one repository branch.
///
/// Construct once and share; the inner HTTP client pools connections.
#[derive(Debug, Clone)]
pub struct GithubContentStore {
    http: reqwest::Client,
    base: Url,
    owner: String,
    repo: String,
    branch: String,
}

impl GithubContentStore {
    /// Validates `config` and builds the authenticated HTTP client.
    pub fn new(config: &GithubConfig) -> Result<Self, GithubConfigError> {
        config.validate()?;

        let base = Url::parse(&config.api_base).map_err(|e| GithubConfigError::InvalidBaseUrl {
            url: config.api_base.clone(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(GithubConfigError::InvalidBaseUrl {
                url: config.api_base.clone(),
                message: "expected an absolute http(s) URL".to_string(),
            });
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| GithubConfigError::MissingToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GithubConfigError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base,
            owner: config.owner.trim().to_string(),
            repo: config.repo.trim().to_string(),
            branch: config.branch.trim().to_string(),
        })
    }

    /// The branch every call targets.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// `{base}/repos/{owner}/{repo}/contents/{path}` with every segment
    /// percent-encoded.
    pub fn contents_url(&self, path: &ContentPath) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
                .extend(path.segments());
        }
        url
    }

    fn request(&self, method: Method, path: &ContentPath) -> RequestBuilder {
        self.http.request(method, self.contents_url(path))
    }

    /// Sends a request and returns the body of a success response.
    async fn send(&self, request: RequestBuilder, path: &ContentPath) -> Result<String, StoreError> {
        let response = request.send().await.map_err(|e| StoreError::Transport {
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| StoreError::Transport {
            message: e.to_string(),
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "GitHub response");
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound { path: path.clone() });
        }
        if !status.is_success() {
            return Err(wire::rejection(
                status.as_u16(),
                status.canonical_reason().unwrap_or("error"),
                &body,
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl ContentStore for GithubContentStore {
    #[instrument(level = "debug", skip_all, fields(path = %path))]
    async fn get_file(&self, path: &ContentPath) -> Result<RemoteFile, StoreError> {
        let request = self
            .request(Method::GET, path)
            .query(&[("ref", self.branch.as_str())]);
        let body = self.send(request, path).await?;
        wire::decode_file(&body)
    }

    #[instrument(level = "debug", skip_all, fields(path = %path, update = revision.is_some()))]
    async fn put_file(
        &self,
        path: &ContentPath,
        content: &str,
        message: &str,
        revision: Option<&RevisionSha>,
    ) -> Result<CommitResult, StoreError> {
        let body = PutRequest::new(
            content,
            message,
            &self.branch,
            revision.map(RevisionSha::as_str),
        );
        let request = self.request(Method::PUT, path).json(&body);
        let body = self.send(request, path).await?;
        wire::decode_commit(&body)
    }

    #[instrument(level = "debug", skip_all, fields(dir = %dir))]
    async fn list_files(&self, dir: &ContentPath) -> Result<Vec<FileEntry>, StoreError> {
        let request = self
            .request(Method::GET, dir)
            .query(&[("ref", self.branch.as_str())]);
        let body = self.send(request, dir).await?;
        wire::decode_listing(&body)
    }

    #[instrument(level = "debug", skip_all, fields(path = %path))]
    async fn delete_file(
        &self,
        path: &ContentPath,
        revision: &RevisionSha,
        message: &str,
    ) -> Result<(), StoreError> {
        let body = DeleteRequest {
            message,
            sha: revision.as_str(),
            branch: &self.branch,
        };
        let request = self.request(Method::DELETE, path).json(&body);
        self.send(request, path).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(api_base: &str) -> GithubContentStore {
        let config = GithubConfig::new("ghp_0123456789abcdef", "octocat", "notes")
            .with_branch("dev")
            .with_api_base(api_base);
        GithubContentStore::new(&config).unwrap()
    }

    #[test]
    fn builds_contents_url() {
        let s = store("https://api.github.com");
        let url = s.contents_url(&ContentPath::new("memories/2024-05/2024-05-06_abc.md").unwrap());
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octocat/notes/contents/memories/2024-05/2024-05-06_abc.md"
        );
        assert_eq!(s.branch(), "dev");
    }

    #[test]
    fn keeps_enterprise_prefix_and_encodes_segments() {
        let s = store("https://ghe.example.com/api/v3/");
        let url = s.contents_url(&ContentPath::new("memories/2024-05/a b#c.md").unwrap());
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/octocat/notes/contents/memories/2024-05/a%20b%23c.md"
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        let config = GithubConfig::new("ghp_0123456789abcdef", "o", "r").with_api_base("not a url");
        assert!(matches!(
            GithubContentStore::new(&config),
            Err(GithubConfigError::InvalidBaseUrl { .. })
        ));

        let config = GithubConfig::new("ghp_0123456789abcdef", "o", "r").with_api_base("mailto:x@y");
        assert!(matches!(
            GithubContentStore::new(&config),
            Err(GithubConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn refuses_placeholder_token() {
        let config = GithubConfig::new("REPLACE_WITH_GITHUB_TOKEN", "o", "r");
        assert!(matches!(
            GithubContentStore::new(&config),
            Err(GithubConfigError::MissingToken)
        ));
    }
}
