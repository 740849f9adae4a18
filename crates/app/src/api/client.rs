//! HTTP client for the storefront REST API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url, header::ACCEPT};
use serde_json::Value;
use tracing::{debug, warn};

use super::ApiError;
use crate::session::AuthToken;

/// Thin JSON client over the backend's base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: Url,
    http: Client,
}

impl RestClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the URL cannot take endpoint
    /// paths, or [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|error| ApiError::InvalidBaseUrl(error.to_string()))?;

        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, http })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the base cannot take paths.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Start a request to an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the endpoint cannot be built.
    pub fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .http
            .request(method, self.endpoint(segments)?)
            .header(ACCEPT, "application/json"))
    }

    /// Start an authenticated request to an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the endpoint cannot be built.
    pub fn authorized(
        &self,
        method: Method,
        segments: &[&str],
        token: &AuthToken,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request(method, segments)?.bearer_auth(token.expose()))
    }

    /// Send a request and decode the JSON body. An empty body decodes to
    /// `null`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a body
    /// that is not JSON.
    pub async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let error = ApiError::from_response(status, &body);

            warn!(%status, path = %url, %error, "request failed");

            return Err(error);
        }

        debug!(%status, path = %url, "request succeeded");

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn client(base: &str) -> Result<RestClient, ApiError> {
        RestClient::new(base, Duration::from_secs(5))
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() -> TestResult {
        let client = client("https://api.example/ellectra/v1")?;

        assert_eq!(
            client.endpoint(&["cart", "update", "CART000123"])?.as_str(),
            "https://api.example/ellectra/v1/cart/update/CART000123"
        );

        Ok(())
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() -> TestResult {
        let client = client("https://api.example/ellectra/v1/")?;

        assert_eq!(
            client.endpoint(&["cart", "view"])?.as_str(),
            "https://api.example/ellectra/v1/cart/view"
        );

        Ok(())
    }

    #[test]
    fn endpoint_encodes_ids() -> TestResult {
        let client = client("https://api.example")?;

        assert_eq!(
            client.endpoint(&["past_order", "update-status", "ORD 1/2"])?.as_str(),
            "https://api.example/past_order/update-status/ORD%201%2F2"
        );

        Ok(())
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            client("mailto:shop@example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(client("not a url"), Err(ApiError::InvalidBaseUrl(_))));
    }
}
