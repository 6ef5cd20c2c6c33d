use std::path::PathBuf;

use crate::api::ApiError;

/// Errors that terminate a folder download or branch listing.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("not found: {0} (check the branch and folder path)")]
    NotFound(String),

    #[error("rate limited while requesting {0}; retry later or supply a token")]
    RateLimited(String),

    #[error("GitHub API returned HTTP {status} for {target}: {message}")]
    Api {
        status: u16,
        target: String,
        message: String,
    },

    #[error("network error while requesting {target}: {message}")]
    Network { target: String, message: String },

    #[error("cannot write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected response for {target}: {message}")]
    Parse { target: String, message: String },

    #[error("refusing entry {path:?}: {reason}")]
    InvalidEntry { path: String, reason: String },
}

impl FetchError {
    /// Attach the request target to a raw API error. Rate-limit errors map
    /// to `RateLimited` unconditionally; callers only convert them after the
    /// retry budget is spent.
    pub fn from_api(err: ApiError, target: &str) -> Self {
        match err {
            ApiError::RateLimited(_) => Self::RateLimited(target.to_owned()),
            ApiError::NotFound => Self::NotFound(target.to_owned()),
            ApiError::Status { status, message } => Self::Api {
                status,
                target: target.to_owned(),
                message,
            },
            ApiError::Network(message) => Self::Network {
                target: target.to_owned(),
                message,
            },
            ApiError::Parse(message) => Self::Parse {
                target: target.to_owned(),
                message,
            },
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}
