use crate::entry::TreeEntry;
use crate::location::RepoLocation;
use crate::rate_limit::RateLimit;

/// Branches requested per page of the branch listing.
pub const BRANCH_PAGE_SIZE: usize = 100;

/// A successful API response together with the rate-limit state it reported.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub body: T,
    pub rate_limit: RateLimit,
}

impl<T> ApiResponse<T> {
    pub fn new(body: T, rate_limit: RateLimit) -> Self {
        Self { body, rate_limit }
    }
}

/// Errors returned by a single API call, before any retry policy is applied.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("rate limited")]
    RateLimited(RateLimit),

    #[error("not found")]
    NotFound,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// The slice of the GitHub REST API needed to mirror a folder.
///
/// Implementations perform exactly one HTTP exchange per call and never
/// retry; pacing and retries belong to [`FolderFetcher`].
///
/// [`FolderFetcher`]: crate::FolderFetcher
#[async_trait::async_trait]
pub trait ContentsApi: Send + Sync {
    /// List the entries of a folder. A path naming a single file yields
    /// that one entry.
    async fn list_entries(
        &self,
        location: &RepoLocation,
    ) -> Result<ApiResponse<Vec<TreeEntry>>, ApiError>;

    /// Fetch the raw bytes behind a download URL.
    async fn download(&self, url: &str) -> Result<ApiResponse<Vec<u8>>, ApiError>;

    /// One page (1-based) of a repository's branch names, at most
    /// [`BRANCH_PAGE_SIZE`] long.
    async fn list_branches(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
    ) -> Result<ApiResponse<Vec<String>>, ApiError>;
}
