use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Progress events emitted while a folder is being mirrored.
///
/// The fetcher never prints; callers decide how to present these (the CLI
/// prints them to stdout, tests collect them).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A remote folder is about to be listed.
    Listing { path: String },
    /// A file was written locally.
    Downloaded { path: PathBuf, bytes: u64 },
    /// An entry was not materialized (symlink, submodule).
    Skipped { path: String },
    /// Requests are paused until the rate-limit window resets.
    Waiting { delay: Duration },
}

impl Progress {
    /// Returns true if this is a rate-limit pause.
    pub fn is_wait(&self) -> bool {
        matches!(self, Self::Waiting { .. })
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing { path } => write!(f, "Listing {path}/"),
            Self::Downloaded { path, bytes } => {
                write!(f, "Downloaded {} ({bytes} bytes)", path.display())
            }
            Self::Skipped { path } => write!(f, "Skipped {path} (not a file or directory)"),
            Self::Waiting { delay } => write!(
                f,
                "Rate limit reached; waiting {}s. Pass --token to raise the limit.",
                delay.as_secs()
            ),
        }
    }
}
