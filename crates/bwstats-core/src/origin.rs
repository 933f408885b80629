//! Typed client for the origin statistics API
//!
//! All schema validation happens here, at the adapter boundary: downstream
//! code (the aggregator, the services) only ever sees the typed payload
//! structs, never raw JSON shapes. Origin failures are mapped to the error
//! taxonomy here as well, from either the HTTP status or the in-body
//! throttle/cause flags.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::{Error, Result};

/// Production origin API base URL
const DEFAULT_BASE_URL: &str = "https://api.hypixel.net";

/// Origin calls are bounded; past this they count as unavailable
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Raw player envelope returned by the origin
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerPayload {
    /// Absent for players who never joined the platform
    #[serde(default)]
    pub player: Option<RawPlayer>,
}

/// The player record inside a [`PlayerPayload`]
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    /// Display name as the origin knows it
    #[serde(default)]
    pub displayname: Option<String>,
    /// Achievement/progress block; dynamic keys
    #[serde(default)]
    pub achievements: Option<Map<String, Value>>,
    /// Per-game statistics blocks
    #[serde(default)]
    pub stats: Option<RawStats>,
}

/// Per-game statistics container; only the Bedwars block is used
#[derive(Debug, Clone, Deserialize)]
pub struct RawStats {
    /// Bedwars counters; dynamic `{prefix}{suffix}` keys
    #[serde(rename = "Bedwars", default)]
    pub bedwars: Option<Map<String, Value>>,
}

/// One ranked board from the origin leaderboard endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RawBoard {
    /// Board identifier (see `LeaderboardCategory::board_path`)
    pub path: String,
    /// Board title; metadata only
    #[serde(default)]
    pub title: String,
    /// Declared entry count; metadata only
    #[serde(default)]
    pub count: u64,
    /// Stable ids in rank order
    #[serde(default)]
    pub leaders: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LeaderboardsPayload {
    #[serde(default)]
    leaderboards: Option<RawLeaderboards>,
}

#[derive(Debug, Deserialize)]
struct RawLeaderboards {
    #[serde(rename = "BEDWARS", default)]
    bedwars: Vec<RawBoard>,
}

/// In-body failure flags the origin uses alongside non-2xx statuses
#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default)]
    throttle: bool,
    #[serde(default)]
    cause: Option<String>,
}

/// Client for the origin statistics API
#[derive(Debug, Clone)]
pub struct OriginClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl OriginClient {
    /// Create a client with the production base URL and default timeout.
    ///
    /// Fails with [`Error::OriginMisconfigured`] when the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a builder for configuring the client
    pub fn builder(api_key: impl Into<String>) -> OriginClientBuilder {
        OriginClientBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Fetch the raw player record for a stable id
    pub async fn player(&self, uuid: &str) -> Result<PlayerPayload> {
        let mut url = self.endpoint("player")?;
        url.query_pairs_mut()
            .append_pair("uuid", uuid)
            .append_pair("key", &self.api_key);

        debug!("origin player fetch for {uuid}");
        let started = std::time::Instant::now();
        let response = self.client.get(url).send().await?;
        debug!("origin player response after {:?}", started.elapsed());
        log_rate_limit_telemetry(&response);

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(map_failure(status, &body));
        }

        Ok(serde_json::from_slice(&body)
            .map_err(|e| Error::origin_unavailable(format!("malformed player payload: {e}")))?)
    }

    /// Fetch the ranked boards, one per category the origin tracks
    pub async fn leaderboards(&self) -> Result<Vec<RawBoard>> {
        let mut url = self.endpoint("leaderboards")?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        debug!("origin leaderboards fetch");
        let started = std::time::Instant::now();
        let response = self.client.get(url).send().await?;
        debug!("origin leaderboards response after {:?}", started.elapsed());
        log_rate_limit_telemetry(&response);

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(map_failure(status, &body));
        }

        let payload: LeaderboardsPayload = serde_json::from_slice(&body).map_err(|e| {
            Error::origin_unavailable(format!("malformed leaderboards payload: {e}"))
        })?;

        payload
            .leaderboards
            .map(|l| l.bedwars)
            .ok_or_else(|| Error::origin_unavailable("leaderboards block missing"))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::origin_unavailable(format!("bad origin URL: {e}")))
    }
}

/// Map a failed origin response to the error taxonomy
fn map_failure(status: StatusCode, body: &[u8]) -> Error {
    let flags: FailureBody = serde_json::from_slice(body).unwrap_or_default();

    if flags.throttle {
        warn!("origin API key is being throttled");
        return Error::OriginRateLimited;
    }
    if flags.cause.as_deref() == Some("Invalid API key") {
        warn!("origin rejected the API key");
        return Error::OriginUnauthorized;
    }

    Error::origin_unavailable(format!("origin returned HTTP {status}"))
}

/// Log the origin's quota telemetry headers; informational only, this
/// layer never enforces them
fn log_rate_limit_telemetry(response: &Response) {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("?")
            .to_string()
    };

    info!(
        "origin rate limit: {}/{} remaining, resets in {}s",
        header("ratelimit-remaining"),
        header("ratelimit-limit"),
        header("ratelimit-reset"),
    );
}

/// Builder for [`OriginClient`]
#[derive(Debug)]
pub struct OriginClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OriginClientBuilder {
    /// Override the origin base URL (tests point this at a mock server)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout (default 10s)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<OriginClient> {
        if self.api_key.is_empty() {
            return Err(Error::OriginMisconfigured);
        }

        let base_url = Url::parse(&self.base_url)
            .map_err(|e| Error::origin_unavailable(format!("bad origin URL: {e}")))?;
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(OriginClient {
            client,
            base_url,
            api_key: self.api_key,
        })
    }
}
