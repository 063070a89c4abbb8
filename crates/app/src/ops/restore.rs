use std::path::PathBuf;

use clap::Args;

use common::config::Mode;
use common::mover::{Mover, MoverError};

/// Upsert every key of a backup into the destination store
#[derive(Args, Debug, Clone)]
pub struct Restore {
    /// Backup directory to read from
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,

    /// Read JSON lines from stdin instead of a directory
    #[arg(long, conflicts_with = "backup_dir")]
    pub stdin: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("restore failed: {0}")]
    Mover(#[from] MoverError),
}

#[async_trait::async_trait]
impl crate::op::Op for Restore {
    type Error = RestoreError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mode = if self.stdin {
            Mode::RestoreFromStream
        } else {
            Mode::RestoreFromBackup
        };

        let mut config = ctx.settings.to_config(mode);
        if let Some(backup_dir) = &self.backup_dir {
            config.backup_dir = backup_dir.clone();
        }

        let summary = Mover::new(config)?.run().await?;
        Ok(format!("restored {} keys", summary.records))
    }
}
