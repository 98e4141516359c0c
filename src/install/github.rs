//! GitHub API interaction module
//!
//! Provides the HTTP client used for release metadata and asset downloads.

use crate::error::InstallError;
use crate::types::GitHubRelease;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{StatusCode, Url};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Build GitHub API URL for fetching release information
///
/// # Arguments
/// * `api_url` - API root, e.g. "https://api.github.com"
/// * `repo` - Repository in format "owner/repo"
/// * `tag` - Optional release tag (None or "latest" means the latest release)
///
/// Each path segment is percent-encoded, so tags containing `/`, `#` or
/// spaces address the release they name.
pub fn build_gh_release_url(
    api_url: &str,
    repo: &str,
    tag: Option<&str>,
) -> Result<Url, InstallError> {
    let url_error = |message: String| InstallError::MetadataFetch {
        repo: repo.to_string(),
        message,
    };

    let mut url = Url::parse(api_url.trim_end_matches('/'))
        .map_err(|e| url_error(format!("Invalid API URL '{}': {}", api_url, e)))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| url_error(format!("API URL '{}' cannot have a path", api_url)))?;
        segments.pop_if_empty().push("repos").extend(repo.split('/'));
        match tag {
            Some(t) if t != "latest" => segments.extend(["releases", "tags", t]),
            _ => segments.extend(["releases", "latest"]),
        };
    }
    Ok(url)
}

pub struct GitHubClient {
    api_url: String,
    http: reqwest::Client,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: Option<&str>) -> Result<Self, InstallError> {
        let client_error = |message: String| InstallError::MetadataFetch {
            repo: api_url.to_string(),
            message,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ritobin-installer/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| client_error(format!("Invalid GITHUB_TOKEN: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
            tracing::debug!("Using GITHUB_TOKEN");
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| client_error(e.to_string()))?;

        Ok(Self {
            api_url: api_url.to_string(),
            http,
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Fetch release information for `repo` ("owner/repo").
    pub async fn get_release(
        &self,
        repo: &str,
        tag: Option<&str>,
    ) -> Result<GitHubRelease, InstallError> {
        let url = build_gh_release_url(&self.api_url, repo, tag)?;
        tracing::debug!("Fetching GitHub release info from: {}", url);

        let fetch_error = |message: String| InstallError::MetadataFetch {
            repo: repo.to_string(),
            message,
        };

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(fetch_error(match tag {
                    Some(t) if t != "latest" => format!("Release tag '{}' not found", t),
                    _ => "No releases found".to_string(),
                }));
            }
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(fetch_error(format!(
                "GitHub API request failed: {} - {}",
                status, error_text
            )));
        }

        response
            .json::<GitHubRelease>()
            .await
            .map_err(|e| fetch_error(format!("Could not parse release metadata: {}", e)))
    }
}
