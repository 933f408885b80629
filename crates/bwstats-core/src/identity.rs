//! Identity resolution boundary
//!
//! Maps a display name (or a raw stable id) to a [`PlayerIdentity`]. The
//! provider is an external collaborator; this module defines the consumed
//! trait plus a thin HTTP implementation. Resolution failures of any kind
//! collapse into [`Error::PlayerNotFound`] — callers cannot distinguish a
//! missing player from a resolver outage, matching the provider's own
//! behavior.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::model::PlayerIdentity;
use crate::{Error, Result};

/// Production identity provider base URL
const DEFAULT_BASE_URL: &str = "https://playerdb.co";

/// Identity lookups share the origin-call timeout budget
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maps display names to stable identities
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a display name or stable id to an identity
    async fn resolve(&self, name: &str) -> Result<PlayerIdentity>;
}

#[derive(Debug, Deserialize)]
struct ResolveEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ResolveData>,
}

#[derive(Debug, Deserialize)]
struct ResolveData {
    player: ResolvedPlayer,
}

#[derive(Debug, Deserialize)]
struct ResolvedPlayer {
    id: String,
    username: String,
}

/// HTTP identity resolver (PlayerDB-style API)
#[derive(Debug, Clone)]
pub struct HttpIdentityResolver {
    client: Client,
    base_url: Url,
}

impl HttpIdentityResolver {
    /// Create a resolver against the production provider
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a resolver against a custom base URL (tests use this)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::origin_unavailable(format!("bad resolver URL: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn resolve(&self, name: &str) -> Result<PlayerIdentity> {
        let url = self
            .base_url
            .join(&format!("api/player/minecraft/{name}"))
            .map_err(|_| Error::PlayerNotFound)?;

        let started = std::time::Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|_| Error::PlayerNotFound)?;
        debug!("identity lookup for {name} took {:?}", started.elapsed());

        if !response.status().is_success() {
            return Err(Error::PlayerNotFound);
        }

        let envelope: ResolveEnvelope =
            response.json().await.map_err(|_| Error::PlayerNotFound)?;

        match envelope.data {
            Some(data) if envelope.success => Ok(PlayerIdentity {
                uuid: data.player.id,
                username: data.player.username,
            }),
            _ => Err(Error::PlayerNotFound),
        }
    }
}
