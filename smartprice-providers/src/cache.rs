//! Rate caching using Moka.
//!
//! Successful rates are kept for `ttl`; failures are remembered for the
//! shorter `error_ttl` so an upstream outage is not hammered on every request.
//! Concurrent misses for the same pair share a single upstream call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use smartprice_types::{ProviderError, RateSource};

/// Default cache capacity (number of currency pairs).
pub const DEFAULT_RATE_CACHE_CAPACITY: u64 = 10_000;

type RateKey = (String, String);
type RateResult = Result<f64, ProviderError>;

/// Per-entry lifetime: `ttl` for rates, `error_ttl` for failures.
struct RateExpiry {
    ttl: Duration,
    error_ttl: Duration,
}

impl Expiry<RateKey, RateResult> for RateExpiry {
    fn expire_after_create(
        &self,
        _key: &RateKey,
        value: &RateResult,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(if value.is_ok() { self.ttl } else { self.error_ttl })
    }
}

/// Caches any [`RateSource`] by `(base, target)`.
pub struct CachedRateSource<S: RateSource> {
    inner: S,
    entries: Cache<RateKey, RateResult>,
}

impl<S: RateSource> CachedRateSource<S> {
    pub fn new(inner: S, ttl: Duration, error_ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, error_ttl, DEFAULT_RATE_CACHE_CAPACITY)
    }

    /// Bounds the cache to `max_capacity` pairs; the least useful are evicted first.
    pub fn with_capacity(inner: S, ttl: Duration, error_ttl: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(RateExpiry { ttl, error_ttl })
            .build();

        Self { inner, entries }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Approximate number of cached pairs after pending maintenance runs.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[async_trait]
impl<S: RateSource> RateSource for CachedRateSource<S> {
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<f64, ProviderError> {
        let key = (base.to_string(), target.to_string());
        let inner = &self.inner;
        self.entries
            .get_with(key, async move {
                tracing::debug!(base, target, "rate cache miss");
                inner.fetch_rate(base, target).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct CountingSource {
        calls: AtomicU32,
        fail: bool,
        delay: Duration,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail,
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for CountingSource {
        async fn fetch_rate(&self, _base: &str, target: &str) -> Result<f64, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                Err(ProviderError::Http(503))
            } else if target == "EUR" {
                Ok(0.92)
            } else {
                Ok(1.5)
            }
        }
    }

    // Moka keeps its own clock, so expiry tests use short real lifetimes.
    const TTL: Duration = Duration::from_millis(400);
    const ERROR_TTL: Duration = Duration::from_millis(100);

    fn cache(source: CountingSource) -> CachedRateSource<CountingSource> {
        CachedRateSource::new(source, TTL, ERROR_TTL)
    }

    #[tokio::test]
    async fn test_success_cached_for_ttl() {
        let cache = cache(CountingSource::new(false));
        assert_eq!(cache.fetch_rate("USD", "EUR").await, Ok(0.92));
        assert_eq!(cache.fetch_rate("USD", "EUR").await, Ok(0.92));
        assert_eq!(cache.inner().calls(), 1);

        tokio::time::sleep(TTL + Duration::from_millis(100)).await;
        assert_eq!(cache.fetch_rate("USD", "EUR").await, Ok(0.92));
        assert_eq!(cache.inner().calls(), 2);
    }

    #[tokio::test]
    async fn test_errors_cached_for_shorter_ttl() {
        let cache = cache(CountingSource::new(true));
        assert!(cache.fetch_rate("USD", "EUR").await.is_err());
        assert!(cache.fetch_rate("USD", "EUR").await.is_err());
        assert_eq!(cache.inner().calls(), 1);

        tokio::time::sleep(ERROR_TTL + Duration::from_millis(100)).await;
        assert!(cache.fetch_rate("USD", "EUR").await.is_err());
        assert_eq!(cache.inner().calls(), 2);
    }

    #[tokio::test]
    async fn test_pairs_cached_independently() {
        let cache = cache(CountingSource::new(false));
        cache.fetch_rate("USD", "EUR").await.unwrap();
        cache.fetch_rate("USD", "GBP").await.unwrap();
        cache.fetch_rate("EUR", "USD").await.unwrap();
        assert_eq!(cache.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let mut source = CountingSource::new(false);
        source.delay = Duration::from_millis(50);
        let cache = cache(source);

        let (a, b, c) = tokio::join!(
            cache.fetch_rate("USD", "EUR"),
            cache.fetch_rate("USD", "EUR"),
            cache.fetch_rate("USD", "EUR"),
        );

        assert_eq!((a, b, c), (Ok(0.92), Ok(0.92), Ok(0.92)));
        assert_eq!(cache.inner().calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_targets_stay_within_capacity() {
        let cache = CachedRateSource::with_capacity(CountingSource::new(true), TTL, TTL, 16);
        for i in 0..500 {
            let _ = cache.fetch_rate("USD", &format!("X{:03}", i)).await;
        }
        assert!(cache.entry_count().await <= 16);
    }
}
