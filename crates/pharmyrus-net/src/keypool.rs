//! API key rotation pool for credential-gated search targets.
//!
//! Keys are handed out round-robin and may be shared by multiple in-flight
//! calls; exhaustion is reported per call, not per checkout. A key reported
//! exhausted cools down for a fixed window before becoming eligible again.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pharmyrus_core::defaults::KEY_COOLDOWN_SECS;
use pharmyrus_core::{Error, Result};

struct KeySlot {
    key: String,
    cooling_until: Option<Instant>,
}

impl KeySlot {
    fn is_available(&self, now: Instant) -> bool {
        match self.cooling_until {
            Some(until) => now >= until,
            None => true,
        }
    }
}

struct PoolState {
    slots: Vec<KeySlot>,
    cursor: usize,
}

/// Round-robin credential pool with per-key cooldown.
///
/// The single `Mutex` around the slot table is the only critical section;
/// no caller holds it across an outbound call.
pub struct ApiKeyPool {
    state: Mutex<PoolState>,
    cooldown: Duration,
}

impl ApiKeyPool {
    /// Create a pool from a non-empty key list.
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::Config("API key pool requires at least one key".into()));
        }

        info!(key_count = keys.len(), "Initializing API key pool");

        Ok(Self {
            state: Mutex::new(PoolState {
                slots: keys
                    .into_iter()
                    .map(|key| KeySlot {
                        key,
                        cooling_until: None,
                    })
                    .collect(),
                cursor: 0,
            }),
            cooldown: Duration::from_secs(KEY_COOLDOWN_SECS),
        })
    }

    /// Override the cooldown window.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Build a pool from the `SERPAPI_KEYS` environment variable
    /// (comma-separated).
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("SERPAPI_KEYS")
            .map_err(|_| Error::Config("SERPAPI_KEYS is not set".into()))?;
        let keys: Vec<String> = raw
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self::new(keys)
    }

    /// Acquire the next usable credential, round-robin among keys not
    /// currently cooling down.
    ///
    /// Fails with [`Error::PoolExhausted`] when every key is cooling.
    pub async fn acquire(&self) -> Result<String> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let len = state.slots.len();

        for offset in 0..len {
            let idx = (state.cursor + offset) % len;
            if state.slots[idx].is_available(now) {
                state.slots[idx].cooling_until = None;
                state.cursor = (idx + 1) % len;
                return Ok(state.slots[idx].key.clone());
            }
        }

        warn!("Every API key is cooling down");
        Err(Error::PoolExhausted)
    }

    /// Mark a credential unusable for the cooldown window.
    ///
    /// Unknown keys are ignored; a racing caller may report a key that was
    /// already rotated out of the pool's view.
    pub async fn report_exhausted(&self, key: &str) {
        let until = Instant::now() + self.cooldown;
        let mut state = self.state.lock().await;

        if let Some(slot) = state.slots.iter_mut().find(|s| s.key == key) {
            debug!(cooldown_secs = self.cooldown.as_secs(), "Cooling exhausted API key");
            slot.cooling_until = Some(until);
        }
    }

    /// Number of keys currently eligible for acquisition.
    pub async fn available(&self) -> usize {
        let now = Instant::now();
        let state = self.state.lock().await;
        state.slots.iter().filter(|s| s.is_available(now)).count()
    }

    /// Total key count (cooling or not).
    pub async fn len(&self) -> usize {
        self.state.lock().await.slots.len()
    }

    /// True when the pool holds no keys at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
