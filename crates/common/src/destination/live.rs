use async_trait::async_trait;
use reqwest::StatusCode;

use super::Destination;
use crate::error::TransferError;
use crate::record::Record;
use crate::store::{Location, StoreClient};

const VALUE_ACCEPTED: [StatusCode; 3] = [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];

/// Upserts every record into the destination store.
#[derive(Debug, Clone)]
pub struct LiveSync {
    destination: StoreClient,
}

impl LiveSync {
    pub fn new(destination: StoreClient) -> Self {
        Self { destination }
    }
}

#[async_trait]
impl Destination for LiveSync {
    fn moves_properties(&self) -> bool {
        true
    }

    async fn accept(&self, record: Record) -> Result<(), TransferError> {
        let location = Location::Value {
            bucket_type: &record.bucket_type,
            bucket: &record.bucket,
            key: &record.key,
        };

        match self
            .destination
            .put_bytes(location, record.value.clone(), &VALUE_ACCEPTED)
            .await
        {
            Ok(_) => {
                tracing::trace!(record = %record, "wrote key");
                Ok(())
            }
            Err(source) => Err(TransferError::Write {
                bucket_type: record.bucket_type,
                bucket: record.bucket,
                key: record.key,
                source,
            }),
        }
    }
}
