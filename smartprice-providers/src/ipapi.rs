//! IP geolocation via ipapi.co.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use smartprice_types::{IpGeoRecord, IpGeolocationProvider, ProviderError};

use crate::http::{build_client, map_reqwest_error, read_json};

/// ipapi.co JSON payload. Errors come back as 200 with `error: true`.
#[derive(Debug, Default, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    country_code: Option<String>,
    country_name: Option<String>,
    currency: Option<String>,
    city: Option<String>,
    region: Option<String>,
    timezone: Option<String>,
}

impl TryFrom<IpApiResponse> for IpGeoRecord {
    type Error = ProviderError;

    fn try_from(resp: IpApiResponse) -> Result<Self, Self::Error> {
        if resp.error {
            let reason = resp.reason.unwrap_or_else(|| "unknown error".into());
            return Err(if reason.contains("RateLimited") {
                ProviderError::RateLimited
            } else {
                ProviderError::Upstream(reason)
            });
        }

        let country_code = resp
            .country_code
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::Malformed("missing country_code".into()))?;

        Ok(IpGeoRecord {
            country_code,
            country_name: resp.country_name,
            currency: resp.currency,
            city: resp.city,
            region: resp.region,
            timezone: resp.timezone,
        })
    }
}

/// ipapi.co client. `GET {base}/{ip}/json/`, or `{base}/json/` for the caller.
pub struct IpApiProvider {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl IpApiProvider {
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

    fn url(&self, ip: Option<&str>) -> String {
        match ip {
            Some(ip) => format!("{}/{}/json/", self.base_url, ip),
            None => format!("{}/json/", self.base_url),
        }
    }
}

#[async_trait]
impl IpGeolocationProvider for IpApiProvider {
    #[tracing::instrument(skip(self))]
    async fn lookup(&self, ip: Option<&str>) -> Result<IpGeoRecord, ProviderError> {
        let resp = self
            .http
            .get(self.url(ip))
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        let body: IpApiResponse = read_json(resp, self.timeout).await?;
        body.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<IpGeoRecord, ProviderError> {
        serde_json::from_str::<IpApiResponse>(json).unwrap().try_into()
    }

    #[test]
    fn test_parse_success() {
        let record = parse(
            r#"{"ip":"8.8.8.8","city":"Mountain View","region":"California",
                "country_code":"US","country_name":"United States",
                "currency":"USD","timezone":"America/Los_Angeles"}"#,
        )
        .unwrap();
        assert_eq!(record.country_code, "US");
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.city.as_deref(), Some("Mountain View"));
        assert_eq!(record.timezone.as_deref(), Some("America/Los_Angeles"));
    }

    #[test]
    fn test_parse_rate_limited() {
        let err = parse(r#"{"error":true,"reason":"RateLimited","message":"slow down"}"#)
            .unwrap_err();
        assert_eq!(err, ProviderError::RateLimited);
    }

    #[test]
    fn test_parse_reserved_address() {
        let err = parse(r#"{"ip":"127.0.0.1","error":true,"reason":"Reserved IP Address"}"#)
            .unwrap_err();
        assert_eq!(err, ProviderError::Upstream("Reserved IP Address".into()));
    }

    #[test]
    fn test_parse_missing_country() {
        let err = parse(r#"{"ip":"1.2.3.4"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_url() {
        let provider =
            IpApiProvider::new("https://ipapi.co/", Duration::from_secs(1), "test").unwrap();
        assert_eq!(provider.url(Some("8.8.8.8")), "https://ipapi.co/8.8.8.8/json/");
        assert_eq!(provider.url(None), "https://ipapi.co/json/");
    }
}
