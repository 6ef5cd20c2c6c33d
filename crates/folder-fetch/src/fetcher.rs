use std::future::Future;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiResponse, BRANCH_PAGE_SIZE, ContentsApi};
use crate::clock::{Clock, TokioClock};
use crate::entry::{EntryKind, TreeEntry};
use crate::error::FetchError;
use crate::location::RepoLocation;
use crate::progress::Progress;
use crate::rate_limit::{DEFAULT_BACKOFF, RateLimit};

type ProgressFn = Box<dyn Fn(&Progress) + Send + Sync>;

/// Tunables for a [`FolderFetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Wait used when a rate-limit response names no reset time.
    pub fallback_backoff: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            fallback_backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Summary of a completed folder download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    pub skipped: usize,
}

/// Mirrors a remote repository folder onto the local filesystem.
///
/// Requests are issued one at a time. A rate-limit answer is retried exactly
/// once after waiting for the advertised reset; every other failure aborts
/// the run immediately. Files written before a failure are left in place.
pub struct FolderFetcher<A, C = TokioClock> {
    api: A,
    clock: C,
    options: FetchOptions,
    progress: Option<ProgressFn>,
}

impl<A: ContentsApi> FolderFetcher<A> {
    pub fn new(api: A) -> Self {
        Self::with_clock(api, TokioClock)
    }
}

impl<A: ContentsApi, C: Clock> FolderFetcher<A, C> {
    pub fn with_clock(api: A, clock: C) -> Self {
        Self {
            api,
            clock,
            options: FetchOptions::default(),
            progress: None,
        }
    }

    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a callback receiving every [`Progress`] event.
    pub fn on_progress(mut self, f: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// List the entries of one remote folder.
    pub async fn list_entries(
        &self,
        location: &RepoLocation,
    ) -> Result<Vec<TreeEntry>, FetchError> {
        let mut pace = RateLimit::default();
        self.list_paced(&mut pace, location).await
    }

    /// List every branch name of a repository, following pagination until
    /// a short page.
    pub async fn list_branches(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<String>, FetchError> {
        let mut pace = RateLimit::default();
        let target = format!("{owner}/{repo} branches");
        let mut branches = Vec::new();

        for page in 1.. {
            let batch = self
                .call(&mut pace, &target, || self.api.list_branches(owner, repo, page))
                .await?;
            let done = batch.len() < BRANCH_PAGE_SIZE;
            branches.extend(batch);

            if done {
                break;
            }
        }

        Ok(branches)
    }

    /// Download every file under `location` into `destination_root`,
    /// recreating the remote directory structure beneath it.
    ///
    /// Folders are walked depth-first with siblings in API order. A local
    /// directory is only created once its remote listing succeeded, so a bad
    /// branch or path leaves the filesystem untouched.
    pub async fn fetch_folder(
        &self,
        location: &RepoLocation,
        destination_root: &Path,
    ) -> Result<FetchReport, FetchError> {
        let mut pace = RateLimit::default();
        let mut report = FetchReport::default();
        let mut pending = vec![(location.clone(), destination_root.to_path_buf())];

        while let Some((folder, local_dir)) = pending.pop() {
            let entries = self.list_paced(&mut pace, &folder).await?;

            // The requested path named a file rather than a folder
            if let [single] = entries.as_slice()
                && single.kind == EntryKind::File
                && single.path == folder.path
            {
                report.bytes += self.fetch_file(&mut pace, single, &local_dir).await?;
                report.files += 1;
                continue;
            }

            std::fs::create_dir_all(&local_dir)
                .map_err(|e| FetchError::filesystem(&local_dir, e))?;
            report.directories += 1;

            let mut subfolders = Vec::new();

            for entry in &entries {
                if !entry.has_safe_name() {
                    return Err(FetchError::InvalidEntry {
                        path: entry.path.clone(),
                        reason: "name is not a single path component".into(),
                    });
                }

                let local_path = local_dir.join(&entry.name);

                match entry.kind {
                    EntryKind::Dir => subfolders.push((folder.child(&entry.name), local_path)),
                    EntryKind::File => {
                        report.bytes += self.fetch_file(&mut pace, entry, &local_path).await?;
                        report.files += 1;
                    }
                    EntryKind::Other => {
                        warn!(
                            path = %entry.path,
                            kind = %entry.kind,
                            "skipping entry that is not a file or directory"
                        );
                        self.emit(Progress::Skipped {
                            path: entry.path.clone(),
                        });
                        report.skipped += 1;
                    }
                }
            }

            // Reversed so the first listed subfolder is popped next
            pending.extend(subfolders.into_iter().rev());
        }

        info!(
            files = report.files,
            directories = report.directories,
            bytes = report.bytes,
            "folder download complete"
        );

        Ok(report)
    }

    async fn list_paced(
        &self,
        pace: &mut RateLimit,
        location: &RepoLocation,
    ) -> Result<Vec<TreeEntry>, FetchError> {
        self.emit(Progress::Listing {
            path: location.path.clone(),
        });
        debug!(%location, "listing folder");

        let target = location.to_string();
        self.call(pace, &target, || self.api.list_entries(location))
            .await
    }

    async fn fetch_file(
        &self,
        pace: &mut RateLimit,
        entry: &TreeEntry,
        local_path: &Path,
    ) -> Result<u64, FetchError> {
        let url = entry
            .download_url
            .as_deref()
            .ok_or_else(|| FetchError::InvalidEntry {
                path: entry.path.clone(),
                reason: "file has no download URL".into(),
            })?;

        debug!(path = %entry.path, url, "downloading file");
        let bytes = self.call(pace, &entry.path, || self.api.download(url)).await?;

        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FetchError::filesystem(parent, e))?;
        }
        std::fs::write(local_path, &bytes).map_err(|e| FetchError::filesystem(local_path, e))?;

        let written = bytes.len() as u64;
        self.emit(Progress::Downloaded {
            path: local_path.to_path_buf(),
            bytes: written,
        });

        Ok(written)
    }

    /// Issue one API call under the pacing policy.
    ///
    /// Sleeps first if the previous response exhausted the quota, and
    /// retries once after a rate-limit answer. `pace` is updated with the
    /// rate-limit state of the last successful response.
    async fn call<T, F, Fut>(
        &self,
        pace: &mut RateLimit,
        target: &str,
        mut request: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ApiResponse<T>, ApiError>>,
    {
        if let Some(delay) = pace.throttle_delay(self.clock.now_unix()) {
            info!(
                delay_secs = delay.as_secs(),
                "rate limit quota exhausted; pausing until reset"
            );
            self.wait(delay).await;
        }

        let mut retried = false;

        loop {
            match request().await {
                Ok(response) => {
                    *pace = response.rate_limit;
                    return Ok(response.body);
                }
                Err(ApiError::RateLimited(limit)) if !retried => {
                    retried = true;
                    let delay =
                        limit.retry_delay(self.clock.now_unix(), self.options.fallback_backoff);
                    info!(
                        request = target,
                        delay_secs = delay.as_secs(),
                        "rate limited; retrying once after waiting"
                    );
                    self.wait(delay).await;
                }
                Err(err) => return Err(FetchError::from_api(err, target)),
            }
        }
    }

    async fn wait(&self, delay: Duration) {
        self.emit(Progress::Waiting { delay });
        self.clock.sleep(delay).await;
    }

    fn emit(&self, event: Progress) {
        if let Some(f) = &self.progress {
            f(&event);
        }
    }
}
