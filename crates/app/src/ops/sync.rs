use clap::Args;

use common::config::Mode;
use common::mover::{Mover, MoverError};

/// Copy bucket properties and every key from the source store into the destination store
#[derive(Args, Debug, Clone)]
pub struct SyncStores;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("sync failed: {0}")]
    Mover(#[from] MoverError),
}

#[async_trait::async_trait]
impl crate::op::Op for SyncStores {
    type Error = SyncError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = ctx.settings.to_config(Mode::Sync);
        let summary = Mover::new(config)?.run().await?;
        Ok(super::describe(&summary))
    }
}
