//! GraphQL transport against the catalog server.
//!
//! One POST endpoint, `{query, variables}` in, `{data}` out. Transient
//! failures (rate limiting, 5xx, connect/timeout) are retried with
//! exponential backoff and jitter; every request is bounded by a timeout.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use tagflow_model::{JitterStrategy, RetryStrategy};

use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("tagflow/", env!("CARGO_PKG_VERSION"));
const DEFAULT_BASE_URL: &str = "http://localhost:9999";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for the catalog server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Server base URL; the GraphQL endpoint is derived from it.
    pub base_url: String,
    /// API key sent as the `ApiKey` header when authentication is enabled.
    pub api_key: Option<String>,
    /// Per-request timeout. A hung request stalls its caller for at most
    /// this long.
    pub timeout_ms: u64,
    pub retry: RetryStrategy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryStrategy::default(),
        }
    }
}

/// Client for the catalog's GraphQL API.
pub struct CatalogClient {
    http: reqwest::Client,
    graphql_url: String,
    api_key: Option<String>,
    retry: RetryStrategy,
}

impl CatalogClient {
    pub fn new(cfg: &CatalogConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            graphql_url: graphql_url(&cfg.base_url),
            api_key: cfg.api_key.clone(),
            retry: cfg.retry.clone(),
        })
    }

    /// Execute one GraphQL operation, retrying transient failures within
    /// the configured budget. Returns the `data` payload.
    pub async fn execute(&self, query: &str, variables: Value) -> ClientResult<Value> {
        let payload = json!({ "query": query, "variables": variables });

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.post_once(&payload).await {
                Ok(data) => return Ok(data),
                Err(e) if attempt < self.retry.max_attempts && e.is_transient() => {
                    let delay = self.retry_delay(attempt + 1);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "catalog request failed, retrying",
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once(&self, payload: &Value) -> ClientResult<Value> {
        debug!(url = %self.graphql_url, "posting graphql request");

        let mut request = self.http.post(&self.graphql_url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.header("ApiKey", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(ClientError::Graphql(errors.to_string()));
        }
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.retry.base_delay_ms(attempt);
        Duration::from_millis(apply_jitter(base, self.retry.jitter))
    }
}

/// Derive the GraphQL endpoint from a base URL, tolerating trailing slashes.
fn graphql_url(base_url: &str) -> String {
    format!("{}/graphql", base_url.trim_end_matches('/'))
}

fn apply_jitter(base_ms: u64, jitter: JitterStrategy) -> u64 {
    if base_ms == 0 {
        return 0;
    }
    let mut rng = rand::thread_rng();
    match jitter {
        JitterStrategy::None => base_ms,
        JitterStrategy::Full => rng.gen_range(0..=base_ms),
        JitterStrategy::Equal => rng.gen_range(base_ms / 2..=base_ms),
    }
}
