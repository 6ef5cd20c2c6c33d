pub mod api;
pub mod clock;
pub mod entry;
pub mod error;
pub mod fetcher;
pub mod location;
pub mod progress;
pub mod rate_limit;

pub use api::{ApiError, ApiResponse, BRANCH_PAGE_SIZE, ContentsApi};
pub use clock::{Clock, TokioClock};
pub use entry::{EntryKind, TreeEntry};
pub use error::FetchError;
pub use fetcher::{FetchOptions, FetchReport, FolderFetcher};
pub use location::{LocationError, RepoLocation};
pub use progress::Progress;
pub use rate_limit::{DEFAULT_BACKOFF, RESET_MARGIN, RateLimit};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
