use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::{
    ApiError, ApiResponse, BRANCH_PAGE_SIZE, Clock, ContentsApi, RateLimit, RepoLocation, TreeEntry,
};

/// In-memory repository for testing. Folders are derived from the files added.
///
/// Errors queued with [`fail_next`](FakeApi::fail_next) are returned, in
/// order, by the next calls of any kind before normal answers resume.
#[derive(Default)]
pub struct FakeApi {
    folders: HashMap<String, Vec<TreeEntry>>,
    blobs: HashMap<String, Vec<u8>>,
    branches: Vec<String>,
    success_rate_limit: RateLimit,
    queued_errors: Mutex<VecDeque<ApiError>>,
    request_errors: Mutex<HashMap<String, VecDeque<ApiError>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Download URL the fake assigns to a repository path.
    pub fn url_for(path: &str) -> String {
        format!("fake://raw/{path}")
    }

    /// Add a file, creating every ancestor folder listing on the way.
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        let url = Self::url_for(path);
        self.blobs.insert(url.clone(), content.into());
        self.insert_entry(TreeEntry::file(path, url));
        self
    }

    /// Add an entry verbatim (e.g. a symlink or a malformed record).
    pub fn with_entry(mut self, entry: TreeEntry) -> Self {
        self.insert_entry(entry);
        self
    }

    pub fn with_branches(mut self, branches: &[&str]) -> Self {
        self.branches = branches.iter().map(|b| (*b).to_owned()).collect();
        self
    }

    /// Rate-limit state reported by every successful answer.
    pub fn with_success_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.success_rate_limit = rate_limit;
        self
    }

    pub fn fail_next(self, error: ApiError) -> Self {
        lock(&self.queued_errors).push_back(error);
        self
    }

    /// Fail one specific request, e.g. `get fake://raw/docs/a.txt`, once per
    /// queued error.
    pub fn fail_request(self, request: &str, error: ApiError) -> Self {
        lock(&self.request_errors)
            .entry(request.to_owned())
            .or_default()
            .push_back(error);
        self
    }

    /// Every call made so far, as `list <path>`, `get <url>` or
    /// `branches <owner>/<repo> page <n>`.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    fn insert_entry(&mut self, entry: TreeEntry) {
        let parent = parent_of(&entry.path).to_owned();
        let listing = self.folders.entry(parent.clone()).or_default();
        if !listing.iter().any(|e| e.path == entry.path) {
            listing.push(entry);
        }

        if !parent.is_empty() {
            self.insert_entry(TreeEntry::dir(&parent));
        }
    }

    fn record(&self, request: String) -> Result<(), ApiError> {
        let keyed = lock(&self.request_errors)
            .get_mut(&request)
            .and_then(VecDeque::pop_front);
        lock(&self.requests).push(request);

        if let Some(err) = keyed {
            return Err(err);
        }

        match lock(&self.queued_errors).pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_file(&self, path: &str) -> Option<&TreeEntry> {
        self.folders
            .get(parent_of(path))?
            .iter()
            .find(|e| e.path == path && e.download_url.is_some())
    }
}

#[async_trait::async_trait]
impl ContentsApi for FakeApi {
    async fn list_entries(
        &self,
        location: &RepoLocation,
    ) -> Result<ApiResponse<Vec<TreeEntry>>, ApiError> {
        self.record(format!("list {}", location.path))?;

        if let Some(entries) = self.folders.get(&location.path) {
            return Ok(ApiResponse::new(entries.clone(), self.success_rate_limit));
        }

        match self.find_file(&location.path) {
            Some(file) => Ok(ApiResponse::new(vec![file.clone()], self.success_rate_limit)),
            None => Err(ApiError::NotFound),
        }
    }

    async fn download(&self, url: &str) -> Result<ApiResponse<Vec<u8>>, ApiError> {
        self.record(format!("get {url}"))?;

        self.blobs
            .get(url)
            .cloned()
            .map(|bytes| ApiResponse::new(bytes, self.success_rate_limit))
            .ok_or(ApiError::NotFound)
    }

    async fn list_branches(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
    ) -> Result<ApiResponse<Vec<String>>, ApiError> {
        self.record(format!("branches {owner}/{repo} page {page}"))?;

        let batch = self
            .branches
            .chunks(BRANCH_PAGE_SIZE)
            .nth(page.saturating_sub(1) as usize)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        Ok(ApiResponse::new(batch, self.success_rate_limit))
    }
}

/// Clock that records requested sleeps and advances its own time instead
/// of waiting.
pub struct ManualClock {
    now: Mutex<u64>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn at(now_unix: u64) -> Self {
        Self {
            now: Mutex::new(now_unix),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }
}

#[async_trait::async_trait]
impl Clock for ManualClock {
    fn now_unix(&self) -> u64 {
        *lock(&self.now)
    }

    async fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
        *lock(&self.now) += duration.as_secs();
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
