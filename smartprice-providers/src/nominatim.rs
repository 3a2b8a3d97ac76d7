//! Reverse geocoding via OpenStreetMap Nominatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use smartprice_types::{Coordinates, ProviderError, ReverseGeocodeRecord, ReverseGeocoder};

use crate::http::{build_client, map_reqwest_error, read_json};

#[derive(Debug, Default, Deserialize)]
struct NominatimResponse {
    error: Option<String>,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    country_code: Option<String>,
    country: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
}

impl TryFrom<NominatimResponse> for ReverseGeocodeRecord {
    type Error = ProviderError;

    fn try_from(resp: NominatimResponse) -> Result<Self, Self::Error> {
        if let Some(error) = resp.error {
            return Err(ProviderError::Upstream(error));
        }

        let address = resp.address;
        // Nominatim reports lowercase ISO codes ("de").
        let country_code = address
            .country_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ProviderError::Malformed("missing address.country_code".into()))?;

        Ok(ReverseGeocodeRecord {
            country_code,
            country_name: address.country,
            city: address.city.or(address.town).or(address.village),
            region: address.state,
        })
    }
}

/// Nominatim client: `GET {base}/reverse?format=json&lat&lon&zoom=10&addressdetails=1`.
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl NominatimGeocoder {
    /// `user_agent` must identify the application; the public instance
    /// blocks requests without one.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: build_client(timeout, user_agent)?,
            timeout,
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    #[tracing::instrument(skip(self))]
    async fn reverse(&self, coordinates: Coordinates) -> Result<ReverseGeocodeRecord, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "json".to_string()),
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lon.to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        let body: NominatimResponse = read_json(resp, self.timeout).await?;
        body.try_into()
    }
}
