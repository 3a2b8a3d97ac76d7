//! Shared reqwest plumbing for the provider adapters.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use smartprice_types::ProviderError;

/// Default `User-Agent` sent upstream. Nominatim rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("smartprice/", env!("CARGO_PKG_VERSION"));

/// Builds a client with a request timeout and identifying user agent.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Maps transport failures onto [`ProviderError`].
pub fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else if err.is_decode() {
        ProviderError::Malformed(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Checks the status and decodes a JSON body.
pub async fn read_json<T: DeserializeOwned>(
    resp: Response,
    timeout: Duration,
) -> Result<T, ProviderError> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }
    if !status.is_success() {
        return Err(ProviderError::Http(status.as_u16()));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| map_reqwest_error(e, timeout))?;
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::Malformed(e.to_string()))
}
