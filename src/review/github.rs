use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use super::ReviewSystem;
use crate::error::{ApiError, CommentPostError};
use crate::http;

/// GitHub caps the pull request file listing at 100 entries per page
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct PullFile {
    filename: String,
    #[serde(default)]
    previous_filename: Option<String>,
}

/// GitHub REST API client scoped to one repository
pub struct GitHub {
    client: Client,
    api_url: String,
    repository: String,
    token: Option<String>,
}

impl GitHub {
    /// `repository` is the `owner/name` slug
    pub fn new(api_url: &str, repository: &str, token: Option<String>) -> Result<Self, ApiError> {
        Ok(Self {
            client: http::client()?,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.trim_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn files_url(&self, pr: u64, page: usize) -> String {
        format!(
            "{}/repos/{}/pulls/{}/files?per_page={}&page={}",
            self.api_url, self.repository, pr, PER_PAGE, page
        )
    }

    pub fn comments_url(&self, pr: u64) -> String {
        format!("{}/repos/{}/issues/{}/comments", self.api_url, self.repository, pr)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn files_page(&self, pr: u64, page: usize) -> Result<Vec<PullFile>, ApiError> {
        let url = self.files_url(pr, page);
        debug!(%url, "listing pull request files");

        let response = http::send(&url, self.authorized(self.client.get(&url)))?;
        let response = http::ensure_success(&url, response)?;
        let body = http::text(&url, response)?;
        serde_json::from_str(&body).map_err(|source| ApiError::Malformed { url, source })
    }
}

/// Walk pages starting at 1 until one comes back short of `PER_PAGE`
///
/// Renamed files contribute their previous path ahead of the new one.
fn collect_pages<F>(mut fetch_page: F) -> Result<Vec<String>, ApiError>
where
    F: FnMut(usize) -> Result<Vec<PullFile>, ApiError>,
{
    let mut paths = Vec::new();
    for page in 1.. {
        let files = fetch_page(page)?;
        let last_page = files.len() < PER_PAGE;
        for file in files {
            if let Some(previous) = file.previous_filename {
                paths.push(previous);
            }
            paths.push(file.filename);
        }
        if last_page {
            break;
        }
    }
    Ok(paths)
}

impl ReviewSystem for GitHub {
    fn list_files(&self, pr: u64) -> Result<Vec<String>, ApiError> {
        collect_pages(|page| self.files_page(pr, page))
    }

    fn post_comment(&self, pr: u64, body: &str) -> Result<(), CommentPostError> {
        let url = self.comments_url(pr);
        debug!(%url, "posting review comment");

        let request = self
            .authorized(self.client.post(&url))
            .json(&serde_json::json!({ "body": body }));
        http::send(&url, request)
            .and_then(|response| http::ensure_success(&url, response))
            .map(|_| ())
            .map_err(|source| CommentPostError { pr, source })
    }
}
