//! REST key-value store client
//!
//! Client for an Upstash-style Redis REST backend: each command is a single
//! HTTP request (`GET {base}/get/{key}`, `POST {base}/setex/{key}/{ttl}`
//! with the value as the request body, and so on) answered with a JSON
//! envelope of the form `{"result": ...}` or `{"error": "..."}`.
//!
//! The request timeout is deliberately short: a slow cache backend must
//! degrade to a miss, not stall the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::store::KvStore;
use crate::{Error, Result};

/// Default request timeout for backend commands
const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// JSON envelope wrapping every backend response
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a REST-protocol key-value backend
#[derive(Debug, Clone)]
pub struct RestKvStore {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestKvStore {
    /// Create a client for the given backend URL and bearer token
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).token(token).build()
    }

    /// Create a builder for configuring the client
    pub fn builder(base_url: &str) -> RestKvStoreBuilder {
        RestKvStoreBuilder {
            base_url: base_url.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a command URL from path segments, percent-encoding each one
    fn command_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?;
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Execute a command and unwrap the response envelope
    async fn execute(
        &self,
        command: &'static str,
        url: Url,
        body: Option<String>,
    ) -> Result<Option<Value>> {
        trace!("KV {} {}", command, url.path());

        let mut request = match body {
            Some(body) => self.client.post(url).body(body),
            None => self.client.get(url),
        };
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let envelope: Envelope = response.json().await?;

        if let Some(error) = envelope.error {
            return Err(Error::backend(error));
        }
        if !status.is_success() {
            return Err(Error::backend(format!("{command} returned HTTP {status}")));
        }

        Ok(envelope.result)
    }
}

#[async_trait]
impl KvStore for RestKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let url = self.command_url(&["get", key])?;
        match self.execute("GET", url, None).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Ok(Some(other.to_string())),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let url = self.command_url(&["setex", key, &ttl_secs.to_string()])?;
        self.execute("SETEX", url, Some(value.to_string())).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let url = self.command_url(&["del", key])?;
        self.execute("DEL", url, None).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let url = self.command_url(&["incr", key])?;
        match self.execute("INCR", url, None).await? {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| Error::unexpected("INCR", format!("non-integer result {n}"))),
            other => Err(Error::unexpected("INCR", format!("{other:?}"))),
        }
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        let url = self.command_url(&["expire", key, &ttl_secs.to_string()])?;
        self.execute("EXPIRE", url, None).await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let url = self.command_url(&["keys", pattern])?;
        match self.execute("KEYS", url, None).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => Ok(values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            Some(other) => Err(Error::unexpected("KEYS", format!("{other}"))),
        }
    }
}

/// Builder for [`RestKvStore`]
#[derive(Debug)]
pub struct RestKvStoreBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl RestKvStoreBuilder {
    /// Set the bearer token sent with every command
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-command request timeout
    ///
    /// Default is 2 seconds. Keep this short: callers treat a timed-out
    /// read as a cache miss.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<RestKvStore> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(RestKvStore {
            client,
            base_url,
            token: self.token,
        })
    }
}
