// src/api/rate_limit.rs
// Per-client request quota for the AI routes

use anyhow::Result;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Requests without connection info (in-process callers) share this key.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Idle clients are dropped from the state map once every this many checks
const SWEEP_INTERVAL: u64 = 1024;

pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    checks: AtomicU64,
}

impl ClientRateLimiter {
    /// Create a limiter allowing `requests_per_minute` per client address
    pub fn new(requests_per_minute: u32) -> Result<Self> {
        let quota = Quota::per_minute(
            NonZeroU32::new(requests_per_minute)
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limit"))?,
        );

        Ok(Self::with_quota(quota))
    }

    fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            checks: AtomicU64::new(0),
        }
    }

    /// Consume one request for `client`; false when over quota
    pub fn check(&self, client: IpAddr) -> bool {
        let allowed = self.limiter.check_key(&client).is_ok();
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep();
        }
        allowed
    }

    /// Forget clients whose quota has fully refilled
    fn sweep(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(tracked = self.tracked_clients(), "rate limiter swept idle clients");
    }

    fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

pub async fn limit_by_client(
    State(app): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &app.rate_limiter {
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(UNKNOWN_CLIENT);

        if !limiter.check(client) {
            warn!(%client, path = %request.uri().path(), "rate limit exceeded");
            return AppError::RateLimited.into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_is_per_client() {
        let limiter = ClientRateLimiter::new(2).unwrap();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(!limiter.check(a));
        assert!(limiter.check(b));
    }

    /// One cell back every millisecond
    fn fast_refill_limiter() -> ClientRateLimiter {
        ClientRateLimiter::with_quota(Quota::per_second(NonZeroU32::new(1000).unwrap()))
    }

    #[test]
    fn test_idle_clients_are_forgotten() {
        let limiter = fast_refill_limiter();
        for i in 0..200u32 {
            assert!(limiter.check(IpAddr::from(Ipv4Addr::from(0x0a00_0000 + i))));
        }
        assert_eq!(limiter.tracked_clients(), 200);

        std::thread::sleep(std::time::Duration::from_millis(50));
        limiter.sweep();
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_sweep_runs_during_checks() {
        let limiter = fast_refill_limiter();
        for i in 0..(SWEEP_INTERVAL as u32 - 1) {
            limiter.check(IpAddr::from(Ipv4Addr::from(0x0a00_0000 + i)));
        }
        assert_eq!(limiter.tracked_clients(), SWEEP_INTERVAL as usize - 1);

        std::thread::sleep(std::time::Duration::from_millis(50));
        // The next check reaches the interval and triggers a sweep
        limiter.check("192.168.0.1".parse().unwrap());
        assert!(limiter.tracked_clients() <= 1);
    }

    #[test]
    fn test_zero_quota_is_rejected() {
        assert!(ClientRateLimiter::new(0).is_err());
    }
}
