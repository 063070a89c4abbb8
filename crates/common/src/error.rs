use std::path::PathBuf;

use crate::store::StoreError;

/// Failure moving a single record. Always fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("failed to fetch key '{key}' of bucket '{bucket}' (type '{bucket_type}'): {source}")]
    Fetch {
        bucket_type: String,
        bucket: String,
        key: String,
        source: StoreError,
    },
    #[error("key '{key}' of bucket '{bucket}' (type '{bucket_type}') disappeared from the source")]
    Vanished {
        bucket_type: String,
        bucket: String,
        key: String,
    },
    #[error("failed to write key '{key}' of bucket '{bucket}' (type '{bucket_type}'): {source}")]
    Write {
        bucket_type: String,
        bucket: String,
        key: String,
        source: StoreError,
    },
    #[error(transparent)]
    Backup(#[from] BackupError),
    #[error("transfer worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("all transfer workers exited before the backlog was drained")]
    WorkersGone,
}

/// Local file or stream failure while writing or reading a backup.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("backup stream I/O error: {0}")]
    Stream(#[source] std::io::Error),
    #[error("failed to encode record '{record}': {source}")]
    Encode {
        record: String,
        source: serde_json::Error,
    },
    #[error("failed to decode backup stream line {line}: {source}")]
    Decode {
        line: usize,
        source: serde_json::Error,
    },
    #[error("failed to walk backup directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("backup entry {} has an undecodable name", path.display())]
    InvalidName { path: PathBuf },
}

impl BackupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::Io {
            path: path.into(),
            source,
        }
    }
}
