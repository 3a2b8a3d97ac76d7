//! Per-client rate limiting with Governor's keyed token buckets.
//!
//! Clients are keyed by the TCP peer address. Forwarding headers name the
//! client only when the service is configured to sit behind a trusted proxy,
//! since anyone can send them.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

use super::client_ip::forwarded_client_ip;

/// How often idle client buckets are dropped.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Key for requests that carry no peer address.
const UNKNOWN_PEER: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    trust_forwarded: bool,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// `requests` per `period` per client, which is also the burst size.
    pub fn new(requests: u32, period: Duration) -> Self {
        let requests = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period / requests.get())
            .unwrap_or_else(|| Quota::per_minute(requests))
            .allow_burst(requests);

        Self {
            limiter: RateLimiter::keyed(quota),
            trust_forwarded: false,
        }
    }

    /// Keys on `X-Forwarded-For` / `X-Real-IP` instead of the peer address.
    pub fn trust_forwarded_headers(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }

    /// Returns true if `client` may proceed.
    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Drops buckets that have fully refilled; they carry no state.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Rate-limit key for `request`.
    pub fn client_key(&self, request: &Request<Body>) -> IpAddr {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let forwarded = self
            .trust_forwarded
            .then(|| forwarded_client_ip(request.headers()))
            .flatten()
            .and_then(|ip| ip.parse::<IpAddr>().ok());

        forwarded.or(peer).unwrap_or(UNKNOWN_PEER)
    }
}

/// Prunes idle buckets every [`PRUNE_INTERVAL`] for as long as the limiter is alive elsewhere.
pub fn spawn_pruner(state: &Arc<RateLimiterState>) -> tokio::task::JoinHandle<()> {
    let state = Arc::downgrade(state);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(state) = state.upgrade() else {
                break;
            };
            state.prune();
            tracing::debug!(clients = state.tracked_clients(), "pruned rate limiter");
        }
    })
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let client = limiter.client_key(&request);
    if !limiter.check(client) {
        tracing::warn!(%client, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([203, 0, 113, last])
    }

    fn request(peer: Option<IpAddr>, forwarded: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/currencies");
        if let Some(forwarded) = forwarded {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if let Some(peer) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(SocketAddr::new(peer, 40000)));
        }
        request
    }

    #[test]
    fn test_quota_is_per_client() {
        let state = RateLimiterState::new(2, Duration::from_secs(60));
        assert!(state.check(ip(1)));
        assert!(state.check(ip(1)));
        assert!(!state.check(ip(1)));
        assert!(state.check(ip(2)));
    }

    #[test]
    fn test_forwarded_header_ignored_by_default() {
        let state = RateLimiterState::new(2, Duration::from_secs(60));
        let req = request(Some(ip(1)), Some("198.51.100.9"));
        assert_eq!(state.client_key(&req), ip(1));
    }

    #[test]
    fn test_forwarded_header_used_behind_trusted_proxy() {
        let state = RateLimiterState::new(2, Duration::from_secs(60)).trust_forwarded_headers(true);
        let req = request(Some(ip(1)), Some("198.51.100.9, 10.0.0.1"));
        assert_eq!(state.client_key(&req), IpAddr::from([198, 51, 100, 9]));

        // Garbage in the header falls back to the peer.
        let req = request(Some(ip(1)), Some("not-an-ip"));
        assert_eq!(state.client_key(&req), ip(1));
    }

    #[test]
    fn test_missing_peer_uses_shared_key() {
        let state = RateLimiterState::default();
        assert_eq!(state.client_key(&request(None, None)), UNKNOWN_PEER);
    }

    #[test]
    fn test_prune_drops_refilled_buckets() {
        let state = RateLimiterState::new(2, Duration::from_millis(100));
        for last in 0..50 {
            assert!(state.check(ip(last)));
        }
        assert_eq!(state.tracked_clients(), 50);

        std::thread::sleep(Duration::from_millis(250));
        state.prune();
        assert_eq!(state.tracked_clients(), 0);
    }
}
