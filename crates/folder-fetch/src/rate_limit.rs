use std::time::Duration;

/// Extra time waited past the advertised reset instant, to absorb clock skew
/// between us and the API.
pub const RESET_MARGIN: Duration = Duration::from_secs(5);

/// Wait used when a rate-limit response carries no timing headers.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(60);

/// Rate-limit state reported by a single API response.
///
/// Each call returns its own value; nothing is stored globally. Callers that
/// need to pace subsequent requests carry the last value forward themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// `X-RateLimit-Remaining`
    pub remaining: Option<u64>,
    /// `X-RateLimit-Reset`, in seconds since the Unix epoch.
    pub reset_at: Option<u64>,
    /// `Retry-After`, when given in seconds.
    pub retry_after: Option<Duration>,
}

impl RateLimit {
    /// Build from raw header values. Unparseable values are treated as absent.
    pub fn from_header_values(
        remaining: Option<&str>,
        reset: Option<&str>,
        retry_after: Option<&str>,
    ) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            remaining: parse(remaining),
            reset_at: parse(reset),
            retry_after: parse(retry_after).map(Duration::from_secs),
        }
    }

    /// True if the response says no calls are left in the current window.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// How long to wait before retrying after a rate-limit response.
    ///
    /// `Retry-After` wins; otherwise wait until the reset instant plus
    /// [`RESET_MARGIN`]; otherwise fall back to `fallback`.
    pub fn retry_delay(&self, now_unix: u64, fallback: Duration) -> Duration {
        if let Some(delay) = self.retry_after {
            return delay;
        }

        match self.reset_at {
            Some(reset) => Duration::from_secs(reset.saturating_sub(now_unix)) + RESET_MARGIN,
            None => fallback,
        }
    }

    /// Delay to observe before the next request after a *successful*
    /// response, if that response exhausted the quota.
    pub fn throttle_delay(&self, now_unix: u64) -> Option<Duration> {
        if !self.is_exhausted() {
            return None;
        }

        let reset = self.reset_at?;
        (reset > now_unix).then(|| Duration::from_secs(reset - now_unix) + RESET_MARGIN)
    }
}
