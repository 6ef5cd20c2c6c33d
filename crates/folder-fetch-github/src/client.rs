use folder_fetch::{
    ApiError, ApiResponse, BRANCH_PAGE_SIZE, ContentsApi, RateLimit, RepoLocation, TreeEntry,
};
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::branches::BranchEntry;
use crate::contents::ContentsResponse;

const USER_AGENT: &str = "gh-folder-fetch";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Configuration for talking to the GitHub REST API.
#[derive(Debug, Clone, Default)]
pub struct GitHubClientConfig {
    pub token: Option<String>,
    pub api_base_url: Option<String>,
}

/// `ContentsApi` over GitHub's REST API.
///
/// Each method performs exactly one request and reports the rate-limit
/// headers it saw; retry policy lives in `FolderFetcher`.
pub struct GitHubContentsClient {
    config: GitHubClientConfig,
    client: reqwest::Client,
}

impl GitHubContentsClient {
    pub fn new(config: GitHubClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_base(&self) -> &str {
        self.config
            .api_base_url
            .as_deref()
            .unwrap_or("https://api.github.com")
    }

    /// Build an API URL from path segments, percent-encoding each one.
    fn api_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ApiError> {
        let mut url = Url::parse(self.api_base())
            .map_err(|e| ApiError::Parse(format!("invalid API base URL: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| ApiError::Parse("API base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|s| !s.is_empty()));

        Ok(url)
    }

    fn build_request(&self, url: Url) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url).header("User-Agent", USER_AGENT);

        if let Some(token) = &self.config.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        req
    }

    fn build_api_request(&self, url: Url) -> reqwest::RequestBuilder {
        self.build_request(url)
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<(reqwest::Response, RateLimit), ApiError> {
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let rate_limit = rate_limit_from(response.headers());
        debug!(
            status = response.status().as_u16(),
            remaining = ?rate_limit.remaining,
            url = %response.url(),
            "GitHub response"
        );

        let status = response.status();
        if status.is_success() {
            return Ok((response, rate_limit));
        }

        Err(match status {
            // Secondary limits arrive as a bare 403 with no timing headers
            StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => {
                ApiError::RateLimited(rate_limit)
            }
            StatusCode::NOT_FOUND => ApiError::NotFound,
            _ => ApiError::Status {
                status: status.as_u16(),
                message: error_message(response).await,
            },
        })
    }
}

#[async_trait::async_trait]
impl ContentsApi for GitHubContentsClient {
    async fn list_entries(
        &self,
        location: &RepoLocation,
    ) -> Result<ApiResponse<Vec<TreeEntry>>, ApiError> {
        let mut url = self.api_url(
            ["repos", location.owner.as_str(), location.repo.as_str(), "contents"]
                .into_iter()
                .chain(location.path.split('/')),
        )?;
        url.query_pairs_mut().append_pair("ref", &location.branch);

        let (response, rate_limit) = self.send(self.build_api_request(url)).await?;

        let listing: ContentsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(ApiResponse::new(listing.into_entries(), rate_limit))
    }

    async fn download(&self, url: &str) -> Result<ApiResponse<Vec<u8>>, ApiError> {
        let url = Url::parse(url)
            .map_err(|e| ApiError::Parse(format!("invalid download URL {url:?}: {e}")))?;

        let (response, rate_limit) = self.send(self.build_request(url)).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read file body: {e}")))?;

        Ok(ApiResponse::new(bytes.to_vec(), rate_limit))
    }

    async fn list_branches(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
    ) -> Result<ApiResponse<Vec<String>>, ApiError> {
        let mut url = self.api_url(["repos", owner, repo, "branches"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &BRANCH_PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string());

        let (response, rate_limit) = self.send(self.build_api_request(url)).await?;

        let branches: Vec<BranchEntry> = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(ApiResponse::new(
            branches.into_iter().map(|b| b.name).collect(),
            rate_limit,
        ))
    }
}

/// Read `X-RateLimit-Remaining`, `X-RateLimit-Reset` and `Retry-After`.
pub fn rate_limit_from(headers: &HeaderMap) -> RateLimit {
    let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    RateLimit::from_header_values(
        get("x-ratelimit-remaining"),
        get("x-ratelimit-reset"),
        get("retry-after"),
    )
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// GitHub error bodies are `{"message": ...}`; fall back to the raw text.
async fn error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_else(|_| "unknown".into());

    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if text.is_empty() => "no response body".into(),
        Err(_) => text,
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn rate_limit_from_reads_github_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));

        let rl = rate_limit_from(&headers);
        assert_eq!(rl.remaining, Some(0));
        assert_eq!(rl.reset_at, Some(1_700_000_000));
        assert_eq!(rl.retry_after, None);
    }

    #[test]
    fn api_url_encodes_segments() {
        let client = GitHubContentsClient::new(GitHubClientConfig {
            token: None,
            api_base_url: Some("http://localhost:1234".into()),
        });

        let url = client
            .api_url(["repos", "o", "r", "contents", "my docs", "a#b"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1234/repos/o/r/contents/my%20docs/a%23b"
        );
    }

    #[test]
    fn api_url_rejects_malformed_base_as_parse_error() {
        for base in ["not a url", "mailto:someone@example.com"] {
            let client = GitHubContentsClient::new(GitHubClientConfig {
                token: None,
                api_base_url: Some(base.into()),
            });
            let result = client.api_url(["repos", "o", "r", "branches"]);
            assert!(
                matches!(result, Err(ApiError::Parse(_))),
                "{base}: {result:?}"
            );
        }
    }

    #[test]
    fn api_url_defaults_to_github() {
        let client = GitHubContentsClient::new(GitHubClientConfig::default());
        let url = client.api_url(["repos", "o", "r", "branches"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/o/r/branches");
    }
}
