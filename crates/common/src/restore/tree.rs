use std::path::{Path, PathBuf};

use futures::{stream, StreamExt};
use walkdir::WalkDir;

use super::RecordSource;
use crate::error::{BackupError, TransferError};
use crate::layout::BackupLayout;
use crate::pipeline::Backlog;
use crate::record::Record;

/// Depth of a record file below the backup root: bucket type, bucket, key.
const RECORD_DEPTH: usize = 3;

/// A backup directory written by [`crate::destination::BackupToFile`].
#[derive(Debug, Clone)]
pub struct BackupTree {
    layout: BackupLayout,
    label: String,
    entries: Vec<PathBuf>,
}

impl BackupTree {
    /// Walk `root` once to find every record file. File contents are read
    /// later, one at a time, as the pipeline asks for them.
    ///
    /// This is blocking file system work.
    pub fn scan(root: &Path) -> Result<Self, BackupError> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            if entry.depth() != RECORD_DEPTH {
                tracing::warn!(
                    path = %entry.path().display(),
                    "ignoring file outside the backup layout"
                );
                continue;
            }
            entries.push(entry.into_path());
        }

        tracing::info!(root = %root.display(), records = entries.len(), "scanned backup");

        Ok(Self {
            layout: BackupLayout::new(root),
            label: root.display().to_string(),
            entries,
        })
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl RecordSource for BackupTree {
    fn label(&self) -> &str {
        &self.label
    }

    fn total(&self) -> Option<usize> {
        Some(self.entries.len())
    }

    fn into_backlog(self) -> Backlog<'static, Record> {
        let layout = self.layout;
        stream::iter(self.entries)
            .then(move |path| {
                let layout = layout.clone();
                async move {
                    let (bucket_type, bucket, key) = layout.identity_of(&path)?;
                    let value = tokio::fs::read(&path)
                        .await
                        .map_err(|e| BackupError::io(&path, e))?;
                    Ok::<_, BackupError>(Record::new(bucket_type, bucket, key, value))
                }
            })
            .map(|record| record.map_err(TransferError::from))
            .boxed()
    }
}
