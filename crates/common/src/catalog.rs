//! Enumeration of the source store's buckets and keys.
//!
//! Listings are loaded eagerly: a bucket's full key list sits in memory before
//! any transfer starts, so the largest bucket bounds peak memory use.

use crate::store::{ListBuckets, ListKeys, StoreClient, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("failed to list buckets of type '{bucket_type}': {source}")]
    ListBuckets {
        bucket_type: String,
        source: StoreError,
    },
    #[error("failed to list keys of bucket '{bucket}' (type '{bucket_type}'): {source}")]
    ListKeys {
        bucket_type: String,
        bucket: String,
        source: StoreError,
    },
}

#[derive(Debug, Clone)]
pub struct Catalog {
    source: StoreClient,
}

impl Catalog {
    pub fn new(source: StoreClient) -> Self {
        Self { source }
    }

    /// All buckets of `bucket_type`, in listing order.
    pub async fn list_buckets(&self, bucket_type: &str) -> Result<Vec<String>, DiscoveryError> {
        let response = self
            .source
            .call(ListBuckets { bucket_type })
            .await
            .map_err(|source| DiscoveryError::ListBuckets {
                bucket_type: bucket_type.to_string(),
                source,
            })?;

        tracing::debug!(
            bucket_type,
            count = response.buckets.len(),
            "listed buckets"
        );
        Ok(response.buckets)
    }

    /// All keys of one bucket, in listing order. A bucket the store reports as
    /// not found simply has no keys.
    pub async fn list_keys(
        &self,
        bucket_type: &str,
        bucket: &str,
    ) -> Result<Vec<String>, DiscoveryError> {
        match self.source.call(ListKeys { bucket_type, bucket }).await {
            Ok(response) => {
                tracing::debug!(bucket_type, bucket, count = response.keys.len(), "listed keys");
                Ok(response.keys)
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(bucket_type, bucket, "bucket has no keys");
                Ok(Vec::new())
            }
            Err(source) => Err(DiscoveryError::ListKeys {
                bucket_type: bucket_type.to_string(),
                bucket: bucket.to_string(),
                source,
            }),
        }
    }
}
