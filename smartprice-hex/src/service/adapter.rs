//! SmartPrice presentation adapter.
//!
//! A small state machine a UI binds to. It composes location detection, rate
//! lookup and conversion, and tracks loading/error/permission state:
//!
//! ```text
//! Idle -> DetectingLocation -> FetchingRate -> Ready
//!                 \                               ^
//!                  +--> Error (browser failed, no IP fallback)
//! ```
//!
//! Overlapping calls are safe. Every rate request takes a token and its
//! result is applied only while it is still the latest request for the
//! current currency, so a slow response never overwrites a newer selection.
//! Detection attempts are ordered the same way, except that only a
//! successful attempt supersedes older ones: a failed retry leaves an
//! earlier in-flight detection free to land.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use currency_engine::{RoundingPolicy, convert, format, lookup};
use smartprice_types::domain::DEFAULT_CURRENCY;
use smartprice_types::{
    DetectionError, ExchangeRate, GeolocationPermission, IpGeolocationProvider, LocationResult, PermissionOutcome,
    PermissionState, RateSource, ReverseGeocoder,
};

use super::location::{LocationResolver, ResolveOptions};
use super::rates::ExchangeRateProvider;

/// Lifecycle phase of the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Idle,
    DetectingLocation,
    FetchingRate,
    Ready,
    Error,
}

/// Adapter configuration.
#[derive(Debug, Clone)]
pub struct SmartPriceConfig {
    /// Currency that input amounts are denominated in.
    pub base_currency: String,
    pub prefer_browser_geolocation: bool,
    pub fallback_to_ip: bool,
    /// Caller IP used by the IP strategy.
    pub client_ip: Option<String>,
    pub rounding: RoundingPolicy,
    /// How long to wait for the user to answer the permission prompt.
    pub permission_timeout: Duration,
}

impl Default for SmartPriceConfig {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_CURRENCY.to_string(),
            prefer_browser_geolocation: false,
            fallback_to_ip: true,
            client_ip: None,
            rounding: RoundingPolicy::default(),
            permission_timeout: Duration::from_secs(10),
        }
    }
}

/// Observable state exposed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartPriceSnapshot {
    pub phase: Phase,
    pub user_location: Option<LocationResult>,
    pub exchange_rate: f64,
    pub base_currency: String,
    pub current_currency: String,
    pub is_loading: bool,
    /// Advisory error; never blocks rendering.
    pub error: Option<String>,
    pub geolocation_permission_state: PermissionState,
    /// True once the user picked a currency explicitly.
    pub manual_override: bool,
}

#[derive(Debug)]
struct AdapterState {
    phase: Phase,
    user_location: Option<LocationResult>,
    rate: ExchangeRate,
    current_currency: String,
    location_error: Option<String>,
    rate_error: Option<String>,
    permission_state: PermissionState,
    manual_override: bool,
    /// Token of the last rate response applied.
    applied_rate_token: u64,
    /// Token of the last detection result applied.
    applied_location_token: u64,
    detections_in_flight: u32,
}

impl AdapterState {
    fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::DetectingLocation | Phase::FetchingRate)
    }
}

/// Stateful orchestration of detection, rates and conversion for one UI session.
pub struct SmartPrice<I, G, S, P>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
    P: GeolocationPermission,
{
    resolver: Arc<LocationResolver<I, G>>,
    rates: Arc<ExchangeRateProvider<S>>,
    permission: P,
    config: SmartPriceConfig,
    state: Mutex<AdapterState>,
    rate_token: AtomicU64,
    location_token: AtomicU64,
    cancel: CancellationToken,
}

impl<I, G, S, P> SmartPrice<I, G, S, P>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
    P: GeolocationPermission,
{
    pub fn new(
        resolver: Arc<LocationResolver<I, G>>,
        rates: Arc<ExchangeRateProvider<S>>,
        permission: P,
        config: SmartPriceConfig,
    ) -> Self {
        let base = config.base_currency.trim().to_uppercase();
        let state = AdapterState {
            phase: Phase::Idle,
            user_location: None,
            rate: ExchangeRate::identity(base.clone(), base.clone()),
            current_currency: base.clone(),
            location_error: None,
            rate_error: None,
            permission_state: PermissionState::Prompt,
            manual_override: false,
            applied_rate_token: 0,
            applied_location_token: 0,
            detections_in_flight: 0,
        };

        Self {
            resolver,
            rates,
            permission,
            config: SmartPriceConfig {
                base_currency: base,
                ..config
            },
            state: Mutex::new(state),
            rate_token: AtomicU64::new(0),
            location_token: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    pub fn resolver(&self) -> &LocationResolver<I, G> {
        &self.resolver
    }

    pub fn rates(&self) -> &ExchangeRateProvider<S> {
        &self.rates
    }

    pub fn config(&self) -> &SmartPriceConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, AdapterState> {
        // State updates are plain field writes, so a poisoned lock still holds consistent data.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current observable state.
    pub fn snapshot(&self) -> SmartPriceSnapshot {
        let state = self.state();
        SmartPriceSnapshot {
            phase: state.phase,
            user_location: state.user_location.clone(),
            exchange_rate: state.rate.rate,
            base_currency: self.config.base_currency.clone(),
            current_currency: state.current_currency.clone(),
            is_loading: state.is_loading(),
            error: state.rate_error.clone().or_else(|| state.location_error.clone()),
            geolocation_permission_state: state.permission_state,
            manual_override: state.manual_override,
        }
    }

    /// Converts a base-currency amount with the current rate and rounding policy.
    pub fn converted_amount(&self, base_amount: f64) -> f64 {
        let state = self.state();
        self.convert_with(&state, base_amount)
    }

    /// Converted and formatted amount.
    pub fn formatted_amount(&self, base_amount: f64) -> String {
        let state = self.state();
        let amount = self.convert_with(&state, base_amount);
        format(amount, self.display_currency(&state))
    }

    fn convert_with(&self, state: &AdapterState, base_amount: f64) -> f64 {
        let decimal_places = lookup(self.display_currency(state)).decimal_places;
        convert(base_amount, state.rate.rate, decimal_places, self.config.rounding)
    }

    /// Currency the converted amount is expressed in.
    ///
    /// After a failed rate lookup the identity rate is in effect, so amounts
    /// stay in the base currency rather than being labelled as the selection.
    fn display_currency<'a>(&'a self, state: &'a AdapterState) -> &'a str {
        if state.rate_error.is_some() {
            &self.config.base_currency
        } else {
            &state.current_currency
        }
    }

    /// Mount sequence: detect location, adopt its currency, fetch the rate.
    ///
    /// Detection failures self-heal through the fallback location unless the
    /// browser strategy is preferred without IP fallback, which ends in
    /// [`Phase::Error`] with the currency unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_location(&self) -> SmartPriceSnapshot {
        let token = self.begin_detection();
        let result = self.detect_configured().await;
        self.settle_detection(token, result).await
    }

    async fn detect_configured(&self) -> Option<Result<LocationResult, DetectionError>> {
        let mut options = ResolveOptions {
            prefer_browser_geolocation: self.config.prefer_browser_geolocation,
            fallback_to_ip: self.config.fallback_to_ip,
            client_ip: self.config.client_ip.clone(),
            coordinates: None,
            permission: self.state().permission_state,
        };

        if options.prefer_browser_geolocation {
            if let Some(outcome) = self.ask_permission().await? {
                options.coordinates = outcome.coordinates();
                options.permission = outcome.state();
            }
        }

        self.cancellable(self.resolver.resolve_location(&options)).await
    }

    /// Manual override: switches currency and refreshes only the rate.
    #[tracing::instrument(skip(self))]
    pub async fn change_currency(&self, code: &str) -> SmartPriceSnapshot {
        let code = code.trim().to_uppercase();
        {
            let mut state = self.state();
            state.current_currency = code.clone();
            state.manual_override = true;
        }
        self.refresh_rate(code).await;
        self.snapshot()
    }

    /// User-initiated retry of the browser strategy.
    ///
    /// On failure the previous location and currency are kept and the
    /// reason is recorded as an advisory error.
    #[tracing::instrument(skip(self))]
    pub async fn request_geolocation_permission(&self) -> SmartPriceSnapshot {
        let token = self.begin_detection();
        let result = self.detect_browser().await;
        self.settle_detection(token, result).await
    }

    async fn detect_browser(&self) -> Option<Result<LocationResult, DetectionError>> {
        let (coordinates, permission) = match self.ask_permission().await? {
            Some(outcome) => (outcome.coordinates(), outcome.state()),
            None => (None, PermissionState::Prompt),
        };

        self.cancellable(self.resolver.resolve_browser(coordinates, permission))
            .await
    }

    /// Cancels in-flight work; later results are discarded.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }

    /// Starts a detection attempt and returns its token.
    fn begin_detection(&self) -> u64 {
        let token = self.location_token.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state();
        state.phase = Phase::DetectingLocation;
        state.location_error = None;
        state.detections_in_flight += 1;
        token
    }

    async fn settle_detection(
        &self,
        token: u64,
        result: Option<Result<LocationResult, DetectionError>>,
    ) -> SmartPriceSnapshot {
        {
            let mut state = self.state();
            state.detections_in_flight = state.detections_in_flight.saturating_sub(1);
        }

        match result {
            Some(Ok(location)) => self.adopt_location(token, location).await,
            Some(Err(err)) => self.record_detection_failure(token, err),
            None => {}
        }
        self.snapshot()
    }

    /// Keeps whatever location is in effect. [`Phase::Error`] only when
    /// nothing is displayable and no other detection can still land.
    fn record_detection_failure(&self, token: u64, err: DetectionError) {
        let mut state = self.state();
        if token < state.applied_location_token {
            return;
        }
        tracing::info!(error = %err, "location detection failed");
        state.location_error = Some(err.to_string());
        state.phase = if state.user_location.is_some() || state.manual_override {
            if self.rate_settled(&state) {
                Phase::Ready
            } else {
                Phase::FetchingRate
            }
        } else if state.detections_in_flight > 0 {
            Phase::DetectingLocation
        } else {
            Phase::Error
        };
    }

    fn rate_settled(&self, state: &AdapterState) -> bool {
        state.applied_rate_token == self.rate_token.load(Ordering::SeqCst)
    }

    /// Asks the host for coordinates.
    ///
    /// Outer `None`: cancelled. Inner `None`: the user never answered.
    async fn ask_permission(&self) -> Option<Option<PermissionOutcome>> {
        let limit = self.config.permission_timeout;
        let outcome = self
            .cancellable(tokio::time::timeout(limit, self.permission.request()))
            .await?;

        match outcome {
            Ok(outcome) => {
                self.state().permission_state = outcome.state();
                Some(Some(outcome))
            }
            Err(_) => {
                tracing::info!(?limit, "geolocation permission prompt timed out");
                Some(None)
            }
        }
    }

    async fn adopt_location(&self, token: u64, location: LocationResult) {
        let currency = {
            let mut state = self.state();
            if token < state.applied_location_token {
                tracing::debug!("discarding superseded location result");
                return;
            }
            state.applied_location_token = token;
            // A newer attempt that failed keeps its advisory error.
            let superseded = self.location_token.load(Ordering::SeqCst) != token;
            state.location_error = match location.error.clone() {
                Some(error) => Some(error),
                None if superseded => state.location_error.take(),
                None => None,
            };
            state.user_location = Some(location.clone());

            if state.manual_override {
                // The user's explicit choice owns the rate.
                state.phase = if self.rate_settled(&state) {
                    Phase::Ready
                } else {
                    Phase::FetchingRate
                };
                return;
            }
            state.current_currency = location.currency.clone();
            location.currency
        };

        self.refresh_rate(currency).await;
    }

    async fn refresh_rate(&self, currency: String) {
        let token = self.rate_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.state().phase = Phase::FetchingRate;

        let base = self.config.base_currency.clone();
        let Some(quote) = self.cancellable(self.rates.get_rate(&base, &currency)).await else {
            return;
        };

        let mut state = self.state();
        if self.rate_token.load(Ordering::SeqCst) != token || state.current_currency != currency {
            tracing::debug!(%currency, "discarding stale exchange rate");
            return;
        }
        state.rate = quote.rate;
        state.rate_error = quote.error;
        state.applied_rate_token = token;
        state.phase = Phase::Ready;
    }

    async fn cancellable<F: std::future::Future>(&self, work: F) -> Option<F::Output> {
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            output = work => Some(output),
        }
    }
}
