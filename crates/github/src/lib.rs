//! Chat memory GitHub infrastructure adapter.
//!
//! Implements the [`memory::ContentStore`] trait over the GitHub Contents
//! REST API with `reqwest`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `get_file` | `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}` |
//! | `put_file` | `PUT /repos/{owner}/{repo}/contents/{path}` with `{message, content, branch, sha?}` |
//! | `list_files` | `GET /repos/{owner}/{repo}/contents/{dir}?ref={branch}` |
//! | `delete_file` | `DELETE /repos/{owner}/{repo}/contents/{path}` with `{message, sha, branch}` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Paths,
//! commit messages and cleanup policy come from the [`memory`] crate; this
//! crate only encodes requests, authenticates them with a bearer token, and
//! maps responses (404 to `NotFound`, other non-2xx to `Rejected`).

pub mod client;
pub mod config;
mod wire;

pub use client::GithubContentStore;
pub use config::{
    GithubConfig, GithubConfigError, DEFAULT_API_BASE, DEFAULT_BRANCH, DEFAULT_TIMEOUT_SECS,
};
