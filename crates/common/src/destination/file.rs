use std::path::PathBuf;

use async_trait::async_trait;

use super::{BucketPlan, Destination};
use crate::error::{BackupError, TransferError};
use crate::layout::BackupLayout;
use crate::record::Record;

/// Writes each value to its own file under the backup root.
///
/// Directories are created in `prepare_bucket_type` / `prepare_bucket`, before
/// any worker writes, so `accept` never creates directories.
#[derive(Debug, Clone)]
pub struct BackupToFile {
    layout: BackupLayout,
    skip_existing: bool,
}

impl BackupToFile {
    pub fn new(root: impl Into<PathBuf>, skip_existing: bool) -> Self {
        Self {
            layout: BackupLayout::new(root),
            skip_existing,
        }
    }
}

#[async_trait]
impl Destination for BackupToFile {
    async fn prepare_bucket_type(&self, bucket_type: &str) -> Result<(), BackupError> {
        let dir = self.layout.bucket_type_dir(bucket_type);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BackupError::io(dir, e))
    }

    async fn prepare_bucket(
        &self,
        bucket_type: &str,
        bucket: &str,
    ) -> Result<BucketPlan, BackupError> {
        let dir = self.layout.bucket_dir(bucket_type, bucket);

        if self.skip_existing {
            let exists = tokio::fs::try_exists(&dir)
                .await
                .map_err(|e| BackupError::io(&dir, e))?;
            // presence of the directory is all we check; a bucket left half
            // written by an earlier failed run is skipped too
            if exists {
                tracing::info!(
                    bucket_type,
                    bucket,
                    path = %dir.display(),
                    "backup exists, skipping bucket"
                );
                return Ok(BucketPlan::Skip);
            }
        }

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BackupError::io(dir, e))?;
        Ok(BucketPlan::Transfer)
    }

    async fn accept(&self, record: Record) -> Result<(), TransferError> {
        let path = self
            .layout
            .record_path(&record.bucket_type, &record.bucket, &record.key);
        tokio::fs::write(&path, &record.value)
            .await
            .map_err(|e| BackupError::io(path, e))?;
        Ok(())
    }
}
