use reqwest::StatusCode;

use crate::store::{Location, StoreClient, StoreError};

/// Destination answers that end a properties copy successfully. A 400 means the
/// destination already enforces a configuration it will not replace.
const PROPS_ACCEPTED: [StatusCode; 2] = [StatusCode::NO_CONTENT, StatusCode::BAD_REQUEST];

#[derive(Debug, thiserror::Error)]
pub enum PropertiesError {
    #[error("failed to fetch properties of bucket '{bucket}' (type '{bucket_type}'): {source}")]
    Fetch {
        bucket_type: String,
        bucket: String,
        source: StoreError,
    },
    #[error("failed to store properties of bucket '{bucket}' (type '{bucket_type}'): {source}")]
    Put {
        bucket_type: String,
        bucket: String,
        source: StoreError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesOutcome {
    /// The document was written to the destination.
    Copied,
    /// The destination refused the document as invalid configuration.
    Rejected,
    /// The source has no properties for this bucket.
    Missing,
}

/// Copies bucket properties from the source store to the destination store verbatim.
#[derive(Debug, Clone)]
pub struct PropertiesSync {
    source: StoreClient,
    destination: StoreClient,
}

impl PropertiesSync {
    pub fn new(source: StoreClient, destination: StoreClient) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub async fn sync(
        &self,
        bucket_type: &str,
        bucket: &str,
    ) -> Result<PropertiesOutcome, PropertiesError> {
        let location = Location::Props {
            bucket_type,
            bucket,
        };

        let document = self
            .source
            .get_bytes(location)
            .await
            .map_err(|source| PropertiesError::Fetch {
                bucket_type: bucket_type.to_string(),
                bucket: bucket.to_string(),
                source,
            })?;

        let Some(document) = document else {
            tracing::warn!(bucket_type, bucket, "bucket has no properties");
            return Ok(PropertiesOutcome::Missing);
        };

        let status = self
            .destination
            .put_bytes(location, document, &PROPS_ACCEPTED)
            .await
            .map_err(|source| PropertiesError::Put {
                bucket_type: bucket_type.to_string(),
                bucket: bucket.to_string(),
                source,
            })?;

        if status == StatusCode::BAD_REQUEST {
            tracing::warn!(bucket_type, bucket, "destination rejected bucket properties");
            Ok(PropertiesOutcome::Rejected)
        } else {
            tracing::debug!(bucket_type, bucket, "copied bucket properties");
            Ok(PropertiesOutcome::Copied)
        }
    }
}
