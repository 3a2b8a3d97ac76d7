//! # SmartPrice Client SDK
//!
//! A typed Rust client for the SmartPrice API.
//!
//! Besides the plain endpoint methods, [`SmartPriceClient`] implements the
//! geolocation and rate ports, so a remote server can back the services in
//! `smartprice-hex` (for example the presentation adapter in a CLI).

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use smartprice_types::{
    ConvertQuery, ConvertResponse, Coordinates, CurrencyResponse, HealthResponse, IpGeoRecord,
    IpGeolocationProvider, LocationResult, ProviderError, RateQuote, RateSource,
    ReverseGeocodeRecord, ReverseGeocodeRequest, ReverseGeocoder,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status: 429, .. } => ProviderError::RateLimited,
            ClientError::Api { status, .. } => ProviderError::Http(status),
            ClientError::Http(e) => ProviderError::Network(e.to_string()),
            ClientError::Json(e) => ProviderError::Malformed(e.to_string()),
        }
    }
}

/// SmartPrice API client.
#[derive(Debug, Clone)]
pub struct SmartPriceClient {
    base_url: String,
    forwarded_for: Option<String>,
    http: Client,
}

impl SmartPriceClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            forwarded_for: None,
            http: Client::new(),
        }
    }

    /// Sends `X-Forwarded-For` on every request, so the server detects
    /// `ip` instead of the client's own address.
    pub fn with_forwarded_for(mut self, ip: impl Into<String>) -> Self {
        self.forwarded_for = Some(ip.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Ok(false);
        }
        let body: HealthResponse = resp.json().await?;
        Ok(body.status == "healthy")
    }

    /// Detects the location of the caller (or of the forwarded IP).
    pub async fn detect_location(&self) -> Result<LocationResult, ClientError> {
        self.get("/api/location", &[]).await
    }

    /// Resolves coordinates to a location.
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<LocationResult, ClientError> {
        self.post("/api/location/reverse", &ReverseGeocodeRequest { lat, lon })
            .await
    }

    /// Looks up a rate. `base` defaults to the server's base currency.
    pub async fn exchange_rate(
        &self,
        base: Option<&str>,
        target: &str,
    ) -> Result<RateQuote, ClientError> {
        let mut query = vec![("target", target.to_string())];
        if let Some(base) = base {
            query.push(("base", base.to_string()));
        }
        self.get("/api/exchange-rate", &query).await
    }

    /// Converts and formats an amount on the server.
    pub async fn convert(&self, req: &ConvertQuery) -> Result<ConvertResponse, ClientError> {
        let mut query = vec![
            ("amount", req.amount.to_string()),
            ("currency", req.currency.clone()),
            ("mode", req.mode.to_string()),
        ];
        if let Some(base) = &req.base {
            query.push(("base", base.clone()));
        }
        if let Some(granularity) = req.granularity {
            query.push(("granularity", granularity.to_string()));
        }
        self.get("/api/convert", &query).await
    }

    /// Lists supported currencies.
    pub async fn currencies(&self) -> Result<Vec<CurrencyResponse>, ClientError> {
        self.get("/api/currencies", &[]).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query);
        if let Some(ip) = &self.forwarded_for {
            req = req.header("X-Forwarded-For", ip);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        if let Some(ip) = &self.forwarded_for {
            req = req.header("X-Forwarded-For", ip);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ports backed by a remote SmartPrice server
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl IpGeolocationProvider for SmartPriceClient {
    /// The server picks the address from forwarding headers; `ip` overrides
    /// the client's configured one for this call.
    async fn lookup(&self, ip: Option<&str>) -> Result<IpGeoRecord, ProviderError> {
        let client = match ip {
            Some(ip) => self.clone().with_forwarded_for(ip),
            None => self.clone(),
        };
        let location = client.detect_location().await?;
        if location.is_fallback() {
            return Err(ProviderError::Upstream(
                location
                    .error
                    .unwrap_or_else(|| "location unavailable".into()),
            ));
        }
        Ok(IpGeoRecord {
            country_code: location.country_code,
            country_name: Some(location.country_name),
            currency: Some(location.currency),
            city: location.city,
            region: location.region,
            timezone: location.timezone,
        })
    }
}

#[async_trait]
impl ReverseGeocoder for SmartPriceClient {
    async fn reverse(&self, coordinates: Coordinates) -> Result<ReverseGeocodeRecord, ProviderError> {
        let location = self.reverse_geocode(coordinates.lat, coordinates.lon).await?;
        Ok(ReverseGeocodeRecord {
            country_code: location.country_code,
            country_name: Some(location.country_name),
            city: location.city,
            region: location.region,
        })
    }
}

#[async_trait]
impl RateSource for SmartPriceClient {
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<f64, ProviderError> {
        let quote = self.exchange_rate(Some(base), target).await?;
        match quote.error {
            Some(error) => Err(ProviderError::Upstream(error)),
            None => Ok(quote.rate.rate),
        }
    }
}
