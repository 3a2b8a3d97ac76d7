//! Remote script availability check.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use smartprice_types::{ProviderError, ScriptSource};

use crate::http::{build_client, map_reqwest_error};

/// Treats a resource as loaded once its URL answers with a success status.
pub struct HttpScriptSource {
    url: String,
    http: Client,
    timeout: Duration,
}

impl HttpScriptSource {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            url: url.into(),
            http: build_client(timeout, user_agent)?,
            timeout,
        })
    }
}

#[async_trait]
impl ScriptSource for HttpScriptSource {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<(), ProviderError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            status if status.is_success() => Ok(()),
            status => Err(ProviderError::Http(status.as_u16())),
        }
    }
}
