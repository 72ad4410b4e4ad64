use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::SourceError;
use crate::config::{SecurityConfig, sanitize_for_logging};

const USER_AGENT: &str = concat!("base-standard-score/", env!("CARGO_PKG_VERSION"));

/// JSON HTTP client shared by the provider sources
#[derive(Debug, Clone)]
pub struct ProviderHttpClient {
    client: Client,
    require_https: bool,
    max_response_size: usize,
}

impl ProviderHttpClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(security: &SecurityConfig, timeout: Duration) -> Result<Self> {
        let mut client_builder = Client::builder().timeout(timeout).user_agent(USER_AGENT);

        if security.require_https {
            // Only allow HTTPS connections
            client_builder = client_builder.https_only(true);
            info!("HTTPS enforcement enabled for provider requests");
        }

        let client = client_builder
            .build()
            .context("Failed to create provider HTTP client")?;

        Ok(Self {
            client,
            require_https: security.require_https,
            max_response_size: security.max_response_size,
        })
    }

    /// Join `path` onto `base` and append query pairs
    pub fn endpoint(
        &self,
        base: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, SourceError> {
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        let mut url = self.validate_url(&joined)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Validate URL for security requirements
    pub fn validate_url(&self, url: &str) -> Result<Url, SourceError> {
        let parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if self.require_https && parsed.scheme() != "https" {
            return Err(SourceError::InvalidUrl {
                url: url.to_string(),
                reason: format!("HTTPS is required but URL uses {}", parsed.scheme()),
            });
        }

        if parsed.host_str().is_none() {
            return Err(SourceError::InvalidUrl {
                url: url.to_string(),
                reason: "URL must have a valid host".to_string(),
            });
        }

        Ok(parsed)
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let request = with_headers(self.client.get(url.clone()), headers);
        let body = self.send(&url, request).await?;
        decode(&body)
    }

    /// GET `url`; a 404 is `Ok(None)`
    pub async fn get_json_optional<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<Option<T>, SourceError> {
        match self.get_json(url, headers).await {
            Ok(value) => Ok(Some(value)),
            Err(SourceError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// POST a JSON body to `url` and decode the JSON response
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let request = with_headers(self.client.post(url.clone()).json(body), headers);
        let body = self.send(&url, request).await?;
        decode(&body)
    }

    async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Vec<u8>, SourceError> {
        debug!(
            "Provider request: {}",
            sanitize_for_logging(url.as_str())
        );

        let response = request
            .header("Accept", "application/json")
            .send()
            .await?;

        // Validate response status
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        // Validate response size
        let content_length = response.content_length().unwrap_or(0);
        if content_length > self.max_response_size as u64 {
            return Err(SourceError::TooLarge {
                size: content_length,
                max: self.max_response_size,
            });
        }

        let body = response.bytes().await?;
        if body.len() > self.max_response_size {
            return Err(SourceError::TooLarge {
                size: body.len() as u64,
                max: self.max_response_size,
            });
        }

        Ok(body.to_vec())
    }
}

fn with_headers(mut request: RequestBuilder, headers: &[(&str, &str)]) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, SourceError> {
    Ok(serde_json::from_slice(body)?)
}
