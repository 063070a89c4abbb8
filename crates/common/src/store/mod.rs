//! HTTP access to a bucket-type/bucket/key store.
//!
//! Typed JSON listings go through [`StoreRequest`]; value and properties
//! bodies are moved as raw bytes and never parsed.

mod client;
mod error;
mod location;

pub use client::StoreClient;
pub use error::StoreError;
pub use location::Location;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

pub trait StoreRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, StoreError>;
}

/// List the buckets of one bucket type.
#[derive(Debug, Clone)]
pub struct ListBuckets<'a> {
    pub bucket_type: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListBucketsResponse {
    pub buckets: Vec<String>,
}

impl StoreRequest for ListBuckets<'_> {
    type Response = ListBucketsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, StoreError> {
        let url = Location::Buckets {
            bucket_type: self.bucket_type,
        }
        .url(base_url)?;
        Ok(client.get(url))
    }
}

/// List the keys of one bucket.
#[derive(Debug, Clone)]
pub struct ListKeys<'a> {
    pub bucket_type: &'a str,
    pub bucket: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListKeysResponse {
    pub keys: Vec<String>,
}

impl StoreRequest for ListKeys<'_> {
    type Response = ListKeysResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, StoreError> {
        let url = Location::Keys {
            bucket_type: self.bucket_type,
            bucket: self.bucket,
        }
        .url(base_url)?;
        Ok(client.get(url))
    }
}
