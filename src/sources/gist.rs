//! Resolution of a user gist to the raw text of its latest revision.

use crate::{core::constants::GIST_API_BASE, sources::assets::TextFetcher, MapError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct GistCommit {
    version: String,
}

#[derive(Debug, Deserialize)]
struct GistRevision {
    #[serde(default)]
    files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    raw_url: String,
}

/// A gist id is exactly 32 hex digits.
pub fn check_gist_id(gist_id: &str) -> Result<()> {
    if gist_id.len() == 32 && gist_id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(MapError::InvalidGistId(gist_id.to_string()))
    }
}

/// Version of the newest commit in a `/commits` listing
pub fn latest_version(commits: &str) -> Result<String> {
    let commits: Vec<GistCommit> = serde_json::from_str(commits)?;
    commits
        .into_iter()
        .next()
        .map(|commit| commit.version)
        .ok_or_else(|| MapError::Gist("no commits found for this gist".to_string()))
}

/// Raw URL of the first file of a gist revision.
///
/// Files are taken in name order, which is how GitHub lists them.
pub fn first_raw_url(revision: &str) -> Result<String> {
    let revision: GistRevision = serde_json::from_str(revision)?;
    revision
        .files
        .into_values()
        .next()
        .map(|file| file.raw_url)
        .ok_or_else(|| MapError::Gist("no files found in this gist".to_string()))
}

/// Fetches the latest content of a gist through the GitHub REST API
#[derive(Debug, Clone)]
pub struct GistClient {
    api_base: String,
}

impl Default for GistClient {
    fn default() -> Self {
        Self::new(GIST_API_BASE)
    }
}

impl GistClient {
    /// `api_base` must end with a slash, like [`GIST_API_BASE`]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    pub fn commits_url(&self, gist_id: &str) -> String {
        format!("{}{}/commits", self.api_base, gist_id)
    }

    pub fn revision_url(&self, gist_id: &str, version: &str) -> String {
        format!("{}{}/{}", self.api_base, gist_id, version)
    }

    /// Text of the first file of the latest revision.
    ///
    /// Three requests in sequence: commits, revision, raw file. An invalid
    /// id fails before anything is fetched.
    pub async fn latest_raw(&self, fetcher: &dyn TextFetcher, gist_id: &str) -> Result<String> {
        check_gist_id(gist_id)?;

        let commits = fetcher.fetch_text(&self.commits_url(gist_id)).await?;
        let version = latest_version(&commits)?;
        log::debug!("gist {} is at version {}", gist_id, version);

        let revision = fetcher
            .fetch_text(&self.revision_url(gist_id, &version))
            .await?;
        let raw_url = first_raw_url(&revision)?;

        fetcher.fetch_text(&raw_url).await
    }
}
