use crate::domain::model::{RawResponse, Route};
use crate::domain::ports::ContentFetcher;
use crate::utils::error::{Result, RouterError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches routes from the order service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| RouterError::InvalidConfigValueError {
            field: "server.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        Ok(Self {
            client: Client::new(),
            base_url,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL of `route` on the configured origin.
    pub fn url_for(&self, route: &Route) -> Result<Url> {
        let url = self
            .base_url
            .join(route.as_str())
            .map_err(|e| RouterError::InvalidConfigValueError {
                field: "route".to_string(),
                value: route.to_string(),
                reason: format!("Cannot resolve against {}: {}", self.base_url, e),
            })?;

        if url.origin() != self.base_url.origin() {
            return Err(RouterError::RejectedRoute {
                href: route.to_string(),
            });
        }
        Ok(url)
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, route: &Route, headers: &[(&str, &str)]) -> Result<RawResponse> {
        let url = self.url_for(route)?;
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        tracing::debug!("Response status for {}: {}", route, status);

        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}
