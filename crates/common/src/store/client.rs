use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use url::Url;

use super::error::StoreError;
use super::location::Location;
use super::StoreRequest;

/// HTTP client bound to one store endpoint.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: Url,
    client: Client,
}

impl StoreClient {
    /// Build a client whose every request carries `timeout` as its overall budget.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, StoreError> {
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl(base_url.clone()));
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.clone(),
            client,
        })
    }

    pub async fn call<T: StoreRequest>(&self, request: T) -> Result<T::Response, StoreError> {
        let request_builder = request.build_request(&self.base_url, &self.client)?;
        let response = request_builder.send().await?;

        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(StoreError::HttpStatus(status, response.text().await?))
        }
    }

    /// Fetch a raw body. A 404 is reported as `Ok(None)`; anything but 200 is an error.
    pub async fn get_bytes(&self, location: Location<'_>) -> Result<Option<Bytes>, StoreError> {
        let url = location.url(&self.base_url)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.bytes().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(StoreError::HttpStatus(status, response.text().await?)),
        }
    }

    /// PUT a raw JSON-typed body, treating any status in `accepted` as success.
    pub async fn put_bytes(
        &self,
        location: Location<'_>,
        body: Bytes,
        accepted: &[StatusCode],
    ) -> Result<StatusCode, StoreError> {
        let url = location.url(&self.base_url)?;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if accepted.contains(&status) {
            Ok(status)
        } else {
            Err(StoreError::HttpStatus(status, response.text().await?))
        }
    }
}
