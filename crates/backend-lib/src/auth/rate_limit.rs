// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for authentication attempts.
//!
//! Failed logins are counted per client address; crossing the threshold
//! locks the address out of further attempts until the lockout expires.
//! A successful login clears the counter.

use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of failed attempts before lockout
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (5 minutes)
const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(5 * 60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct AttemptEntry {
    /// Number of failed attempts since the last success or reset
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if one is in effect
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for authentication attempts
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    attempts: Arc<DashMap<IpAddr, AttemptEntry>>,
    max_attempts: u32,
    lockout_duration: Duration,
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCKOUT_DURATION)
    }
}

impl AuthRateLimiter {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    /// Record a failed authentication attempt
    pub fn record_failed_attempt(&self, ip: IpAddr) {
        let now = Instant::now();

        let mut entry = self.attempts.entry(ip).or_insert_with(|| AttemptEntry {
            failed_attempts: 0,
            last_failure: now,
            lockout_expiry: None,
        });

        // An expired lockout resets the counter before the new failure counts
        if entry.lockout_expiry.is_some_and(|expiry| now > expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            tracing::warn!(%ip, "client locked out after repeated failed logins");
        }
    }

    /// Record a successful authentication, clearing the failure history
    pub fn record_success(&self, ip: IpAddr) {
        self.attempts.remove(&ip);
    }

    /// Whether the address is currently allowed to attempt authentication
    pub fn check_rate_limit(&self, ip: IpAddr) -> bool {
        match self.attempts.get(&ip) {
            Some(entry) => match entry.lockout_expiry {
                Some(expiry) => Instant::now() >= expiry,
                None => true,
            },
            None => true,
        }
    }

    /// Drop expired lockouts and stale failure entries
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| {
            if let Some(expiry) = entry.lockout_expiry {
                return now < expiry;
            }
            now.duration_since(entry.last_failure) < Duration::from_secs(24 * 60 * 60)
        });
    }
}
