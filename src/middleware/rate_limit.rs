//! Rate limiting middleware
//!
//! Sliding-window limiter with a small burst allowance, keyed by client
//! address. Applied to the unauthenticated auth endpoints.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::config::RateLimitSettings;
use crate::state::AppState;
use crate::utils::errors::{ChekwasError, Result};

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window_duration: Duration,
    /// Extra requests allowed once the window is full
    pub burst_allowance: u32,
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.max_requests,
            window_duration: Duration::from_secs(settings.window_seconds),
            burst_allowance: settings.burst_allowance,
        }
    }
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    requests: Vec<Instant>,
    burst_used: u32,
    last_reset: Instant,
}

impl RateLimitEntry {
    fn new() -> Self {
        Self {
            requests: Vec::new(),
            burst_used: 0,
            last_reset: Instant::now(),
        }
    }

    /// Drop requests outside the window
    fn cleanup(&mut self, window_duration: Duration) {
        let now = Instant::now();
        self.requests
            .retain(|&time| now.duration_since(time) < window_duration);

        if self.last_reset.elapsed() > window_duration {
            self.burst_used = 0;
            self.last_reset = now;
        }
    }

    fn is_allowed(&mut self, config: &RateLimitConfig) -> bool {
        self.cleanup(config.window_duration);

        if (self.requests.len() as u32) < config.max_requests {
            return true;
        }

        if self.burst_used < config.burst_allowance {
            self.burst_used += 1;
            return true;
        }

        false
    }

    /// Seconds until the oldest request leaves the window
    fn retry_after(&self, window_duration: Duration) -> u64 {
        self.requests
            .first()
            .map(|oldest| window_duration.saturating_sub(oldest.elapsed()).as_secs().max(1))
            .unwrap_or(1)
    }
}

/// Shared limiter state
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    enabled: bool,
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, enabled: bool) -> Self {
        Self {
            config,
            enabled,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(RateLimitConfig::from(settings), settings.enabled)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, RateLimitEntry>>> {
        self.entries
            .lock()
            .map_err(|_| ChekwasError::Internal("rate limiter state poisoned".to_string()))
    }

    /// Record a request for `key`, failing when the limit is exhausted
    pub fn check_rate_limit(&self, key: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut entries = self.lock()?;
        let entry = entries.entry(key.to_string()).or_insert_with(RateLimitEntry::new);

        if entry.is_allowed(&self.config) {
            entry.requests.push(Instant::now());
            debug!(client = key, "Rate limit check passed");
            Ok(())
        } else {
            let retry_after = entry.retry_after(self.config.window_duration);
            warn!(client = key, retry_after = retry_after, "Rate limit exceeded");
            Err(ChekwasError::RateLimitExceeded { retry_after })
        }
    }

    /// Requests left in the current window for `key`
    pub fn remaining(&self, key: &str) -> Result<u32> {
        let entries = self.lock()?;
        let used = entries
            .get(key)
            .map(|entry| {
                let mut entry = entry.clone();
                entry.cleanup(self.config.window_duration);
                entry.requests.len() as u32
            })
            .unwrap_or(0);
        Ok(self.config.max_requests.saturating_sub(used))
    }

    /// Forget clients with no requests in the last two windows
    pub fn cleanup_old_entries(&self) -> Result<usize> {
        let mut entries = self.lock()?;
        let keep_for = self.config.window_duration * 2;
        entries.retain(|_, entry| entry.requests.iter().any(|time| time.elapsed() < keep_for));

        debug!(remaining_entries = entries.len(), "Cleaned up old rate limit entries");
        Ok(entries.len())
    }
}

/// Client key: the peer address when known, else the first forwarded address
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Result<Response> {
    let key = client_key(&request);
    state.rate_limiter.check_rate_limit(&key)?;

    let mut response = next.run(request).await;
    let remaining = state.rate_limiter.remaining(&key)?;
    response
        .headers_mut()
        .insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    Ok(response)
}
