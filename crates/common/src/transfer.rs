use std::sync::Arc;

use async_trait::async_trait;

use crate::destination::Destination;
use crate::error::TransferError;
use crate::pipeline::Transfer;
use crate::record::Record;
use crate::store::{Location, StoreClient};

/// Fetch one key of a bucket from the source and hand the record to a destination.
pub struct FetchAndAccept<D> {
    source: StoreClient,
    bucket_type: String,
    bucket: String,
    destination: Arc<D>,
}

impl<D: Destination> FetchAndAccept<D> {
    pub fn new(
        source: StoreClient,
        bucket_type: impl Into<String>,
        bucket: impl Into<String>,
        destination: Arc<D>,
    ) -> Self {
        Self {
            source,
            bucket_type: bucket_type.into(),
            bucket: bucket.into(),
            destination,
        }
    }
}

#[async_trait]
impl<D: Destination> Transfer for FetchAndAccept<D> {
    type Item = String;

    async fn transfer(&self, key: String) -> Result<(), TransferError> {
        let location = Location::Value {
            bucket_type: &self.bucket_type,
            bucket: &self.bucket,
            key: &key,
        };

        let value = match self.source.get_bytes(location).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                return Err(TransferError::Vanished {
                    bucket_type: self.bucket_type.clone(),
                    bucket: self.bucket.clone(),
                    key,
                })
            }
            Err(source) => {
                return Err(TransferError::Fetch {
                    bucket_type: self.bucket_type.clone(),
                    bucket: self.bucket.clone(),
                    key,
                    source,
                })
            }
        };

        let record = Record::new(self.bucket_type.clone(), self.bucket.clone(), key, value);
        self.destination.accept(record).await
    }
}

/// Hand already-complete records to a destination (restores).
pub struct Accept<D> {
    destination: Arc<D>,
}

impl<D: Destination> Accept<D> {
    pub fn new(destination: Arc<D>) -> Self {
        Self { destination }
    }
}

#[async_trait]
impl<D: Destination> Transfer for Accept<D> {
    type Item = Record;

    async fn transfer(&self, record: Record) -> Result<(), TransferError> {
        self.destination.accept(record).await
    }
}
