use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use tracing::warn;

use crate::{error::AppError, utils::client_ip::client_ip, AppState};

/// Per-address request budget for the contact endpoint.
pub struct ContactLimiter {
    limiter: RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>,
}

impl ContactLimiter {
    pub fn per_minute(max_requests: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(max_requests)),
        }
    }

    /// Consumes one unit of `ip`'s budget if any is left.
    pub fn allow(&self, ip: IpAddr) -> bool {
        self.limiter.check_key(&ip).is_ok()
    }

    /// Drops state for addresses whose budget has fully recovered.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

/// Rejects with 429 before the body is even read once an address exceeds
/// its budget.
pub async fn limit_contact(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer, state.config.trust_proxy);

    if !state.contact_limiter.allow(ip) {
        warn!(client = %ip, "Rate limit exceeded for contact submission");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleventh_request_in_a_minute_is_refused() {
        let limiter = ContactLimiter::per_minute(NonZeroU32::new(10).unwrap());
        let ip: IpAddr = "203.0.113.7".parse().unwrap();
        for attempt in 1..=10 {
            assert!(limiter.allow(ip), "attempt {attempt} should pass");
        }
        assert!(!limiter.allow(ip));
    }

    #[test]
    fn budgets_are_per_address() {
        let limiter = ContactLimiter::per_minute(NonZeroU32::new(1).unwrap());
        let first: IpAddr = "203.0.113.7".parse().unwrap();
        let second: IpAddr = "198.51.100.2".parse().unwrap();
        assert!(limiter.allow(first));
        assert!(!limiter.allow(first));
        assert!(limiter.allow(second));
    }
}
