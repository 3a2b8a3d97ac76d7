//! HTTP request handlers.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use currency_engine::{CurrencyCode, convert_code, format};
use smartprice_types::{
    AppError, ConvertQuery, ConvertResponse, CurrencyResponse, DetectionError,
    ExchangeRateQuery, HealthResponse, IpGeolocationProvider, PermissionState, RateSource,
    ReverseGeocodeRequest, ReverseGeocoder,
};

use super::client_ip::client_ip_from_headers;
use crate::service::{ExchangeRateProvider, LocationResolver};

/// Cache policy for successful rate lookups.
pub const CACHE_SUCCESS: &str = "public, s-maxage=3600, stale-while-revalidate=86400";
/// Cache policy for failed lookups, so an outage is retried soon.
pub const CACHE_ERROR: &str = "public, s-maxage=300";

/// Application state shared across handlers.
pub struct AppState<I, G, S>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
{
    pub resolver: LocationResolver<I, G>,
    pub rates: ExchangeRateProvider<S>,
    pub base_currency: String,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<DetectionError> for ApiError {
    fn from(err: DetectionError) -> Self {
        ApiError(AppError::Detection(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Detection(DetectionError::Provider(_)) => StatusCode::BAD_GATEWAY,
            AppError::Detection(err) if err.is_permission_error() => StatusCode::FORBIDDEN,
            AppError::Detection(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self.0 {
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::Internal(msg) => msg,
            AppError::Detection(err) => err.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn required_code(value: &str, field: &str) -> Result<String, ApiError> {
    let code = value.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)).into());
    }
    Ok(code)
}

fn cache_control(is_error: bool) -> [(header::HeaderName, HeaderValue); 1] {
    let policy = if is_error { CACHE_ERROR } else { CACHE_SUCCESS };
    [(header::CACHE_CONTROL, HeaderValue::from_static(policy))]
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".into(),
    })
}

/// Detects the caller's location from their IP address.
#[tracing::instrument(skip(state, headers))]
pub async fn detect_location<I, G, S>(
    State(state): State<Arc<AppState<I, G, S>>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
{
    let client_ip = client_ip_from_headers(&headers);
    let location = state.resolver.resolve_ip(Some(&client_ip)).await;
    Json(location)
}

/// Resolves browser-reported coordinates to a location.
#[tracing::instrument(skip(state), fields(lat = req.lat, lon = req.lon))]
pub async fn reverse_geocode<I, G, S>(
    State(state): State<Arc<AppState<I, G, S>>>,
    Json(req): Json<ReverseGeocodeRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
{
    let location = state
        .resolver
        .resolve_browser(Some(req.into()), PermissionState::Granted)
        .await?;
    Ok(Json(location))
}

/// Looks up a single exchange rate.
///
/// Upstream failures still answer 200 with the identity rate and an `error`
/// field, cached for a shorter period.
#[tracing::instrument(skip(state))]
pub async fn exchange_rate<I, G, S>(
    State(state): State<Arc<AppState<I, G, S>>>,
    Query(query): Query<ExchangeRateQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
{
    let target = required_code(&query.target, "target")?;
    let base = match query.base.as_deref() {
        Some(base) => required_code(base, "base")?,
        None => state.base_currency.clone(),
    };

    let quote = state.rates.get_rate(&base, &target).await;
    Ok((cache_control(quote.is_error()), Json(quote)))
}

/// Converts an amount from the base currency and formats it.
#[tracing::instrument(skip(state))]
pub async fn convert<I, G, S>(
    State(state): State<Arc<AppState<I, G, S>>>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
{
    if !query.amount.is_finite() {
        return Err(AppError::BadRequest("amount must be a finite number".into()).into());
    }
    let currency = required_code(&query.currency, "currency")?;
    let base = match query.base.as_deref() {
        Some(base) => required_code(base, "base")?,
        None => state.base_currency.clone(),
    };

    let quote = state.rates.get_rate(&base, &currency).await;
    // With the identity rate in effect the amount is still in the base currency.
    let display = if quote.is_error() { base.clone() } else { currency };
    let granularity = query.granularity.and_then(NonZeroU32::new);
    let amount = convert_code(
        query.amount,
        quote.value(),
        &display,
        query.mode,
        granularity,
    );

    let response = ConvertResponse {
        original_amount: query.amount,
        formatted: format(amount, &display),
        base,
        currency: display,
        rate: quote.value(),
        amount,
        error: quote.error.clone(),
    };
    Ok((cache_control(quote.is_error()), Json(response)))
}

/// Lists every currency in the registry.
pub async fn list_currencies() -> impl IntoResponse {
    let currencies: Vec<CurrencyResponse> = CurrencyCode::all()
        .iter()
        .map(|code| CurrencyResponse::from(code.info()))
        .collect();
    Json(currencies)
}
