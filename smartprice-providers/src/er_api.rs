//! Exchange rates via open.er-api.com.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use smartprice_types::{ProviderError, RateSource};

use crate::http::{build_client, map_reqwest_error, read_json};

/// Accepted payload shapes: a single `{rate}`, or the `latest/{base}` table.
/// `Single` must come first since every `Table` field is optional.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RatePayload {
    Single {
        rate: f64,
    },
    Table {
        #[serde(default)]
        result: Option<String>,
        #[serde(rename = "error-type")]
        error_type: Option<String>,
        #[serde(default)]
        rates: HashMap<String, f64>,
    },
}

impl RatePayload {
    fn rate_for(self, target: &str) -> Result<f64, ProviderError> {
        match self {
            RatePayload::Single { rate } => Ok(rate),
            RatePayload::Table {
                result,
                error_type,
                rates,
            } => {
                if result.as_deref() == Some("error") {
                    return Err(ProviderError::Upstream(
                        error_type.unwrap_or_else(|| "unknown error".into()),
                    ));
                }
                rates.get(target).copied().ok_or_else(|| {
                    ProviderError::Malformed(format!("no rate for {}", target))
                })
            }
        }
    }
}

/// open.er-api.com client: `GET {base_url}/latest/{base}`.
pub struct ErApiRateSource {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl ErApiRateSource {
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
impl RateSource for ErApiRateSource {
    #[tracing::instrument(skip(self))]
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<f64, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/latest/{}", self.base_url, base))
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        let payload: RatePayload = read_json(resp, self.timeout).await?;
        payload.rate_for(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(json: &str, target: &str) -> Result<f64, ProviderError> {
        serde_json::from_str::<RatePayload>(json)
            .unwrap()
            .rate_for(target)
    }

    #[test]
    fn test_table_payload() {
        let json = r#"{"result":"success","base_code":"USD","rates":{"USD":1,"EUR":0.92,"INR":83.1}}"#;
        assert_eq!(rate(json, "EUR").unwrap(), 0.92);
        assert_eq!(rate(json, "INR").unwrap(), 83.1);
    }

    #[test]
    fn test_missing_target() {
        let json = r#"{"result":"success","rates":{"EUR":0.92}}"#;
        assert!(matches!(rate(json, "XYZ"), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_error_payload() {
        let json = r#"{"result":"error","error-type":"unsupported-code"}"#;
        assert_eq!(
            rate(json, "EUR").unwrap_err(),
            ProviderError::Upstream("unsupported-code".into())
        );
    }

    #[test]
    fn test_single_rate_payload() {
        assert_eq!(rate(r#"{"rate":149.5}"#, "JPY").unwrap(), 149.5);
    }
}
