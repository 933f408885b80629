//! Error types for the bwstats-core crate

use thiserror::Error;

/// Result type for stats operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for player stats and leaderboard operations
#[derive(Debug, Error)]
pub enum Error {
    /// The player never joined the platform
    #[error("player not found")]
    PlayerNotFound,

    /// The player exists but has never played Bedwars
    #[error("player has no Bedwars history")]
    NoGameHistory,

    /// The origin API key is being throttled upstream
    #[error("origin API key is being rate limited")]
    OriginRateLimited,

    /// The origin API rejected the configured key
    #[error("origin API rejected the configured key")]
    OriginUnauthorized,

    /// No origin API key was configured
    #[error("origin API key not configured")]
    OriginMisconfigured,

    /// The origin API failed in some other way (transport, timeout, 5xx)
    #[error("origin API unavailable: {0}")]
    OriginUnavailable(String),
}

impl Error {
    /// Create an `OriginUnavailable` error
    pub fn origin_unavailable(detail: impl Into<String>) -> Self {
        Self::OriginUnavailable(detail.into())
    }

    /// HTTP status the embedding service should surface for this error.
    ///
    /// Unauthorized maps to 500 rather than 401/403 so credential state is
    /// not leaked to end users.
    pub fn status(&self) -> u16 {
        match self {
            Self::PlayerNotFound | Self::NoGameHistory => 404,
            Self::OriginRateLimited => 429,
            Self::OriginUnauthorized | Self::OriginMisconfigured | Self::OriginUnavailable(_) => {
                500
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::OriginUnavailable("request timed out".to_string())
        } else {
            Self::OriginUnavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn status_mapping() {
        assert_eq!(Error::PlayerNotFound.status(), 404);
        assert_eq!(Error::NoGameHistory.status(), 404);
        assert_eq!(Error::OriginRateLimited.status(), 429);
        assert_eq!(Error::OriginUnauthorized.status(), 500);
        assert_eq!(Error::OriginMisconfigured.status(), 500);
        assert_eq!(Error::origin_unavailable("boom").status(), 500);
    }
}
