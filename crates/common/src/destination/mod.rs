//! Where fetched records go.
//!
//! One [`Destination`] is chosen per run. The two restore modes use
//! [`LiveSync`] as their destination and a [`crate::restore::RecordSource`]
//! in place of catalog discovery.

mod file;
mod live;
mod stream;

use std::sync::Arc;

use async_trait::async_trait;

pub use file::BackupToFile;
pub use live::LiveSync;
pub use stream::BackupToStream;

use crate::error::{BackupError, TransferError};
use crate::record::Record;

/// What to do with a bucket before any of its keys are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPlan {
    Transfer,
    /// Leave the bucket alone: no key listing, no fetches.
    Skip,
}

#[async_trait]
pub trait Destination: Send + Sync + 'static {
    /// Whether bucket properties should be copied ahead of the keys.
    fn moves_properties(&self) -> bool {
        false
    }

    async fn prepare_bucket_type(&self, _bucket_type: &str) -> Result<(), BackupError> {
        Ok(())
    }

    async fn prepare_bucket(
        &self,
        _bucket_type: &str,
        _bucket: &str,
    ) -> Result<BucketPlan, BackupError> {
        Ok(BucketPlan::Transfer)
    }

    async fn accept(&self, record: Record) -> Result<(), TransferError>;

    /// Flush anything buffered. Called after each bucket and at the end of a run.
    async fn finish(&self) -> Result<(), BackupError> {
        Ok(())
    }
}

#[async_trait]
impl<D: Destination + ?Sized> Destination for Arc<D> {
    fn moves_properties(&self) -> bool {
        (**self).moves_properties()
    }

    async fn prepare_bucket_type(&self, bucket_type: &str) -> Result<(), BackupError> {
        (**self).prepare_bucket_type(bucket_type).await
    }

    async fn prepare_bucket(
        &self,
        bucket_type: &str,
        bucket: &str,
    ) -> Result<BucketPlan, BackupError> {
        (**self).prepare_bucket(bucket_type, bucket).await
    }

    async fn accept(&self, record: Record) -> Result<(), TransferError> {
        (**self).accept(record).await
    }

    async fn finish(&self) -> Result<(), BackupError> {
        (**self).finish().await
    }
}
