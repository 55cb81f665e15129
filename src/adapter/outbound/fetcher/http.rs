//! Fetcher that posts the resolved route to an HTTP price service.
//!
//! `200` carries a fare payload. `204` and `404` mean no results. Any other
//! status, and any transport failure, is a network error.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::domain::{PriceObservation, ResolvedRoute};
use crate::error::FetchError;
use crate::port::PriceFetcher;

use super::payload::{parse_observation, today};

/// JSON-over-HTTP price source.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PriceFetcher for HttpFetcher {
    async fn fetch(&self, route: &ResolvedRoute) -> Result<PriceObservation, FetchError> {
        let mut request = self.client.post(self.endpoint.clone()).json(route);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => {
                return Err(FetchError::NoResultsFound)
            }
            status if !status.is_success() => {
                return Err(FetchError::Network(format!(
                    "price service returned {status}"
                )))
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        parse_observation(&body, today())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
