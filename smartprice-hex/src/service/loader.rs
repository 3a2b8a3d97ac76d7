//! Script loader service.
//!
//! Loads a third-party resource (e.g. a widget script) at most once per
//! instance. State lives on the instance, not in globals, so each session or
//! test gets an isolated loader.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use smartprice_types::{ProviderError, ScriptSource};

/// Observable loader state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderSnapshot {
    pub loaded: bool,
    pub loading: bool,
    pub retry_count: u32,
}

pub struct ScriptLoader<S: ScriptSource> {
    source: S,
    max_retries: u32,
    retry_delay: Duration,
    state: Mutex<LoaderSnapshot>,
    /// Serializes load attempts; waiters observe the winner's result.
    gate: tokio::sync::Mutex<()>,
}

impl<S: ScriptSource> ScriptLoader<S> {
    pub fn new(source: S) -> Self {
        Self::with_retries(source, 3, Duration::from_millis(500))
    }

    pub fn with_retries(source: S, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            source,
            max_retries,
            retry_delay,
            state: Mutex::new(LoaderSnapshot::default()),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LoaderSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        *self.state()
    }

    /// Loads the resource, retrying up to `max_retries` times.
    ///
    /// Returns immediately once loaded. Concurrent callers wait for the
    /// in-flight attempt instead of starting their own.
    pub async fn load(&self) -> Result<(), ProviderError> {
        if self.state().loaded {
            return Ok(());
        }

        let _gate = self.gate.lock().await;
        if self.state().loaded {
            return Ok(());
        }
        self.state().loading = true;

        loop {
            match self.source.load().await {
                Ok(()) => {
                    let mut state = self.state();
                    state.loaded = true;
                    state.loading = false;
                    tracing::debug!(retries = state.retry_count, "script loaded");
                    return Ok(());
                }
                Err(err) => {
                    {
                        let mut state = self.state();
                        if state.retry_count >= self.max_retries {
                            state.loading = false;
                            tracing::warn!(error = %err, retries = state.retry_count, "script failed to load");
                            return Err(err);
                        }
                        state.retry_count += 1;
                    }
                    tracing::debug!(error = %err, "script load failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Forgets any previous result so the next `load` starts fresh.
    pub fn reset(&self) {
        *self.state() = LoaderSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Fails the first `failures` attempts, then succeeds.
    struct FlakySource {
        failures: u32,
        attempts: AtomicU32,
    }

    impl FlakySource {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                attempts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ScriptSource for FlakySource {
        async fn load(&self) -> Result<(), ProviderError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if attempt < self.failures {
                Err(ProviderError::Network("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_loads_once() {
        let loader = ScriptLoader::with_retries(FlakySource::new(0), 3, Duration::ZERO);
        loader.load().await.unwrap();
        loader.load().await.unwrap();
        assert_eq!(loader.source.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(
            loader.snapshot(),
            LoaderSnapshot {
                loaded: true,
                loading: false,
                retry_count: 0
            }
        );
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let loader = ScriptLoader::with_retries(FlakySource::new(2), 3, Duration::ZERO);
        loader.load().await.unwrap();
        assert_eq!(loader.snapshot().retry_count, 2);
        assert!(loader.snapshot().loaded);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let loader = ScriptLoader::with_retries(FlakySource::new(10), 2, Duration::ZERO);
        let result = loader.load().await;
        assert!(matches!(result, Err(ProviderError::Network(_))));
        assert_eq!(loader.source.attempts.load(Ordering::SeqCst), 3);
        let snapshot = loader.snapshot();
        assert!(!snapshot.loaded);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.retry_count, 2);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_attempt() {
        let loader = ScriptLoader::with_retries(FlakySource::new(0), 3, Duration::ZERO);
        let (a, b, c) = tokio::join!(loader.load(), loader.load(), loader.load());
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(loader.source.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_allows_reload() {
        let loader = ScriptLoader::with_retries(FlakySource::new(0), 3, Duration::ZERO);
        loader.load().await.unwrap();
        loader.reset();
        assert!(!loader.snapshot().loaded);
        loader.load().await.unwrap();
        assert_eq!(loader.source.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let first = ScriptLoader::with_retries(FlakySource::new(0), 3, Duration::ZERO);
        let second = ScriptLoader::with_retries(FlakySource::new(0), 3, Duration::ZERO);
        first.load().await.unwrap();
        assert!(first.snapshot().loaded);
        assert!(!second.snapshot().loaded);
    }
}
