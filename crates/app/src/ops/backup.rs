use std::path::PathBuf;

use clap::Args;

use common::config::Mode;
use common::mover::{Mover, MoverError};

/// Back up every key of the source store to a directory or to stdout
#[derive(Args, Debug, Clone)]
pub struct Backup {
    /// Directory to write into (one file per key); created if absent
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,

    /// Write one JSON line per key to stdout instead of a directory
    #[arg(long, conflicts_with_all = ["backup_dir", "skip_existing"])]
    pub stdout: bool,

    /// Skip buckets whose directory already exists in the backup
    #[arg(long)]
    pub skip_existing: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("backup failed: {0}")]
    Mover(#[from] MoverError),
}

#[async_trait::async_trait]
impl crate::op::Op for Backup {
    type Error = BackupError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mode = if self.stdout {
            Mode::BackupToStream
        } else {
            Mode::BackupToFile
        };

        let mut config = ctx.settings.to_config(mode);
        if let Some(backup_dir) = &self.backup_dir {
            config.backup_dir = backup_dir.clone();
        }
        config.skip_existing = self.skip_existing;

        let summary = Mover::new(config)?.run().await?;

        // stdout already carries the backup itself
        if self.stdout {
            Ok(String::new())
        } else {
            Ok(super::describe(&summary))
        }
    }
}
