//! Rate-limited HTTP fetcher for search and crawl targets.
//!
//! Every outbound call in the pipeline funnels through here, which is what
//! guarantees the orchestrator is never blocked indefinitely: each call has
//! a hard timeout, a bounded retry budget with exponential backoff and
//! jitter, and a per-target ceiling on simultaneous in-flight requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::sleep;
use tracing::{debug, warn};

use pharmyrus_core::defaults::{
    BACKOFF_BASE_MS, BACKOFF_JITTER_MS, FETCH_MAX_RETRIES, FETCH_TIMEOUT_SECS,
    PER_TARGET_CONCURRENCY,
};
use pharmyrus_core::{Error, Result};

use crate::keypool::ApiKeyPool;

/// Configuration for the rate-limited fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Maximum attempts per call (first try included).
    pub max_retries: u32,
    /// Hard per-call timeout.
    pub timeout: Duration,
    /// Base backoff delay; doubles per failed attempt.
    pub backoff_base: Duration,
    /// Upper bound of the random jitter added to each backoff delay.
    pub backoff_jitter: Duration,
    /// Simultaneous in-flight calls allowed per target.
    pub per_target_concurrency: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: FETCH_MAX_RETRIES,
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            backoff_base: Duration::from_millis(BACKOFF_BASE_MS),
            backoff_jitter: Duration::from_millis(BACKOFF_JITTER_MS),
            per_target_concurrency: PER_TARGET_CONCURRENCY,
        }
    }
}

impl FetcherConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `PHARMYRUS_FETCH_RETRIES` | `3` | Max attempts per call |
    /// | `PHARMYRUS_FETCH_TIMEOUT_SECS` | `30` | Hard per-call timeout |
    /// | `PHARMYRUS_TARGET_CONCURRENCY` | `4` | In-flight cap per target |
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PHARMYRUS_FETCH_RETRIES") {
            if let Ok(n) = val.parse::<u32>() {
                config.max_retries = n.max(1);
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_FETCH_TIMEOUT_SECS") {
            if let Ok(n) = val.parse::<u64>() {
                config.timeout = Duration::from_secs(n.max(1));
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_TARGET_CONCURRENCY") {
            if let Ok(n) = val.parse::<usize>() {
                config.per_target_concurrency = n.max(1);
            }
        }

        config
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the hard per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the backoff base delay.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Set the per-target concurrency ceiling.
    pub fn with_per_target_concurrency(mut self, n: usize) -> Self {
        self.per_target_concurrency = n.max(1);
        self
    }
}

/// Rate-limited HTTP fetcher.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Fetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            gates: Mutex::new(HashMap::new()),
        })
    }

    /// Create a fetcher from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(FetcherConfig::from_env())
    }

    /// Current configuration.
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// GET a JSON document with retry, backoff, and the default timeout.
    pub async fn get_json(
        &self,
        target: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        self.get_json_with_timeout(target, url, params, self.config.timeout)
            .await
    }

    /// GET a JSON document with retry, backoff, and an explicit timeout.
    pub async fn get_json_with_timeout(
        &self,
        target: &str,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value> {
        let gate = self.gate(target).await;
        let mut last_err: Option<Error> = None;

        for attempt in 1..=self.config.max_retries {
            if attempt > 1 {
                sleep(self.backoff_delay(attempt - 1)).await;
            }

            let _permit = gate.acquire().await.map_err(|_| {
                Error::Internal(format!("concurrency gate closed for target {target}"))
            })?;

            match self.single_call(url, params, timeout).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    warn!(target, attempt, error = %e, "Transient fetch failure, will retry");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::RetriesExhausted(
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    /// GET a JSON document from a credential-gated target.
    ///
    /// Each attempt acquires a credential from the pool and appends it as
    /// `key_param`. A quota response (429) reports the credential exhausted
    /// and earns one immediate retry with a fresh credential before
    /// counting against the retry budget. Pool exhaustion surfaces as
    /// [`Error::RetriesExhausted`] so callers treat it like any other
    /// fetch failure.
    pub async fn get_json_keyed(
        &self,
        target: &str,
        url: &str,
        params: &[(&str, String)],
        pool: &ApiKeyPool,
        key_param: &str,
    ) -> Result<Value> {
        let gate = self.gate(target).await;
        let mut last_err: Option<Error> = None;
        let mut quota_free_retry = true;
        let mut attempt = 1u32;

        while attempt <= self.config.max_retries {
            let key = match pool.acquire().await {
                Ok(k) => k,
                Err(Error::PoolExhausted) => {
                    return Err(Error::RetriesExhausted(Error::PoolExhausted.to_string()));
                }
                Err(e) => return Err(e),
            };

            let mut keyed: Vec<(&str, String)> = params.to_vec();
            keyed.push((key_param, key.clone()));

            let result = {
                let _permit = gate.acquire().await.map_err(|_| {
                    Error::Internal(format!("concurrency gate closed for target {target}"))
                })?;
                self.single_call(url, &keyed, self.config.timeout).await
            };

            match result {
                Ok(value) => return Ok(value),
                Err(Error::Status(429)) => {
                    debug!(target, "Credential quota exceeded, rotating key");
                    pool.report_exhausted(&key).await;
                    if quota_free_retry {
                        // One immediate retry with a fresh key, outside
                        // the retry budget and without backoff.
                        quota_free_retry = false;
                        continue;
                    }
                    last_err = Some(Error::QuotaExceeded);
                }
                Err(e) if e.is_transient() => {
                    warn!(target, attempt, error = %e, "Transient fetch failure, will retry");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }

            attempt += 1;
            if attempt <= self.config.max_retries {
                sleep(self.backoff_delay(attempt - 1)).await;
            }
        }

        Err(Error::RetriesExhausted(
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    /// Per-target concurrency gate, created on first use.
    async fn gate(&self, target: &str) -> Arc<Semaphore> {
        let mut gates = self.gates.lock().await;
        gates
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.config.per_target_concurrency)))
            .clone()
    }

    /// Exponential backoff with jitter: `base * 2^(n-1) + rand(0..jitter)`.
    fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        let exp = self.config.backoff_base * 2u32.saturating_pow(failed_attempts.saturating_sub(1));
        let jitter_ms = self.config.backoff_jitter.as_millis() as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
        } else {
            Duration::ZERO
        };
        exp + jitter
    }

    async fn single_call(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value> {
        let response = match self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err(Error::Timeout(timeout.as_secs())),
            Err(e) => return Err(Error::Request(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }
}
