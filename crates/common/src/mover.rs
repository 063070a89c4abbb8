//! Run orchestration.
//!
//! A [`Mover`] walks the configured bucket types of the source store one bucket
//! at a time and drains each bucket through the transfer pipeline into the
//! destination chosen by the run's [`Mode`]. Restores skip discovery and drain a
//! [`RecordSource`] into the destination store instead.

use std::sync::Arc;

use futures::StreamExt;

use crate::catalog::{Catalog, DiscoveryError};
use crate::config::{Config, ConfigError, Mode};
use crate::destination::{BackupToFile, BackupToStream, BucketPlan, Destination, LiveSync};
use crate::error::{BackupError, TransferError};
use crate::pipeline::{Pipeline, Progress};
use crate::properties::{PropertiesError, PropertiesSync};
use crate::restore::{BackupTree, LineStream, RecordSource};
use crate::store::{StoreClient, StoreError};
use crate::transfer::{Accept, FetchAndAccept};

#[derive(Debug, thiserror::Error)]
pub enum MoverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Properties(#[from] PropertiesError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Backup(#[from] BackupError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Buckets whose keys were moved (restores count none).
    pub buckets: usize,
    /// Buckets left alone because their backup already existed.
    pub skipped: usize,
    /// Records handed to the destination.
    pub records: usize,
}

pub struct Mover {
    config: Config,
    source: StoreClient,
    destination: StoreClient,
    catalog: Catalog,
    properties: PropertiesSync,
    pipeline: Pipeline,
}

impl Mover {
    pub fn new(config: Config) -> Result<Self, MoverError> {
        config.validate()?;

        let source = StoreClient::new(&config.source, config.request_timeout)?;
        let destination = StoreClient::new(&config.destination, config.request_timeout)?;
        let catalog = Catalog::new(source.clone());
        let properties = PropertiesSync::new(source.clone(), destination.clone());
        let pipeline = Pipeline::new(config.parallelism, config.progress_interval);

        Ok(Self {
            config,
            source,
            destination,
            catalog,
            properties,
            pipeline,
        })
    }

    /// Also deliver every progress tick to `observer`.
    pub fn with_progress_observer(mut self, observer: flume::Sender<Progress>) -> Self {
        self.pipeline = self.pipeline.with_observer(observer);
        self
    }

    /// Run the configured mode to completion.
    pub async fn run(&self) -> Result<RunSummary, MoverError> {
        tracing::info!(
            mode = %self.config.mode,
            source = %self.config.source,
            destination = %self.config.destination,
            parallelism = self.config.parallelism.get(),
            "starting run"
        );

        let summary = match self.config.mode {
            Mode::Sync => {
                self.copy_into(Arc::new(LiveSync::new(self.destination.clone())))
                    .await?
            }
            Mode::BackupToFile => {
                let root = &self.config.backup_dir;
                tokio::fs::create_dir_all(root)
                    .await
                    .map_err(|e| BackupError::io(root, e))?;
                let destination = BackupToFile::new(root.clone(), self.config.skip_existing);
                self.copy_into(Arc::new(destination)).await?
            }
            Mode::BackupToStream => {
                self.copy_into(Arc::new(BackupToStream::new(tokio::io::stdout())))
                    .await?
            }
            Mode::RestoreFromBackup => {
                let root = self.config.backup_dir.clone();
                let tree = tokio::task::spawn_blocking(move || BackupTree::scan(&root)).await??;
                self.restore_from(tree).await?
            }
            Mode::RestoreFromStream => {
                self.restore_from(LineStream::new("stdin", tokio::io::stdin()))
                    .await?
            }
        };

        tracing::info!(
            buckets = summary.buckets,
            skipped = summary.skipped,
            records = summary.records,
            "finish"
        );
        Ok(summary)
    }

    /// Move every key of every bucket of the configured bucket types into
    /// `destination`, bucket by bucket, in listing order.
    ///
    /// The destination is finished even when the run fails, so records it
    /// already accepted are flushed before the error is returned.
    pub async fn copy_into<D: Destination>(
        &self,
        destination: Arc<D>,
    ) -> Result<RunSummary, MoverError> {
        let copied = self.copy_bucket_types(&destination).await;
        let finished = destination.finish().await;

        let summary = copied?;
        finished?;
        Ok(summary)
    }

    async fn copy_bucket_types<D: Destination>(
        &self,
        destination: &Arc<D>,
    ) -> Result<RunSummary, MoverError> {
        let mut summary = RunSummary::default();

        for bucket_type in &self.config.bucket_types {
            let buckets = self.catalog.list_buckets(bucket_type).await?;
            destination.prepare_bucket_type(bucket_type).await?;

            for bucket in &buckets {
                match self
                    .copy_bucket(bucket_type, bucket, Arc::clone(destination))
                    .await?
                {
                    Some(records) => {
                        summary.buckets += 1;
                        summary.records += records;
                    }
                    None => summary.skipped += 1,
                }
            }
        }

        Ok(summary)
    }

    /// Returns the number of records moved, or `None` if the bucket was skipped.
    async fn copy_bucket<D: Destination>(
        &self,
        bucket_type: &str,
        bucket: &str,
        destination: Arc<D>,
    ) -> Result<Option<usize>, MoverError> {
        if destination.prepare_bucket(bucket_type, bucket).await? == BucketPlan::Skip {
            return Ok(None);
        }

        if destination.moves_properties() {
            self.properties.sync(bucket_type, bucket).await?;
        }

        let keys = self.catalog.list_keys(bucket_type, bucket).await?;
        let total = keys.len();
        tracing::info!(bucket_type, bucket, total, "start sync bucket");

        let transfer = Arc::new(FetchAndAccept::new(
            self.source.clone(),
            bucket_type,
            bucket,
            Arc::clone(&destination),
        ));
        let backlog = futures::stream::iter(keys.into_iter().map(Ok)).boxed();
        let pipeline_summary = self
            .pipeline
            .run(bucket, backlog, Some(total), transfer)
            .await?;

        destination.finish().await?;
        tracing::info!(
            bucket_type,
            bucket,
            offered = pipeline_summary.offered,
            "finish sync bucket"
        );
        Ok(Some(pipeline_summary.offered))
    }

    /// Upsert every record of `source` into the destination store.
    pub async fn restore_from<S: RecordSource>(&self, source: S) -> Result<RunSummary, MoverError> {
        let label = source.label().to_string();
        let total = source.total();
        tracing::info!(label = %label, total = ?total, "start restore");

        let destination = Arc::new(LiveSync::new(self.destination.clone()));
        let transfer = Arc::new(Accept::new(destination));
        let pipeline_summary = self
            .pipeline
            .run(&label, source.into_backlog(), total, transfer)
            .await?;

        tracing::info!(label = %label, offered = pipeline_summary.offered, "finish restore");
        Ok(RunSummary {
            buckets: 0,
            skipped: 0,
            records: pipeline_summary.offered,
        })
    }
}
