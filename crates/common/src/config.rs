use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://riak-0.riak:8098";
pub const DEFAULT_BUCKET_TYPES: [&str; 3] = ["default", "sets", "maps"];
pub const DEFAULT_PARALLELISM: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => panic!("default parallelism must be nonzero"),
};
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_BACKUP_DIR: &str = "./backup";

/// What a run does with the records it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Copy properties and keys from the source store into the destination store.
    Sync,
    /// Write every key of the source store to `<backup_dir>/<type>/<bucket>/<key>`.
    BackupToFile,
    /// Write every key of the source store as JSON lines on stdout.
    BackupToStream,
    /// Upsert every file under `backup_dir` into the destination store.
    RestoreFromBackup,
    /// Upsert every JSON line read from stdin into the destination store.
    RestoreFromStream,
}

impl Mode {
    /// Whether the run starts from the source store's catalog.
    pub fn reads_source(&self) -> bool {
        matches!(self, Mode::Sync | Mode::BackupToFile | Mode::BackupToStream)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Sync => "sync",
            Mode::BackupToFile => "backup-to-file",
            Mode::BackupToStream => "backup-to-stream",
            Mode::RestoreFromBackup => "restore-from-backup",
            Mode::RestoreFromStream => "restore-from-stream",
        };
        f.write_str(name)
    }
}

/// Everything a run needs. Built once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store records are read from.
    pub source: Url,
    /// Store records are written to.
    pub destination: Url,
    /// Bucket types to walk, in order. Not used by the restore modes.
    pub bucket_types: Vec<String>,
    /// Worker count per bucket.
    pub parallelism: NonZeroUsize,
    /// Overall budget of each HTTP request.
    pub request_timeout: Duration,
    /// Period of the progress log line.
    pub progress_interval: Duration,
    pub mode: Mode,
    /// Root of the file backup layout.
    pub backup_dir: PathBuf,
    /// Skip buckets whose backup directory already exists (file backups only).
    pub skip_existing: bool,
}

/// The endpoint both stores default to.
pub fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("hardcoded URL must parse")
}

impl Default for Config {
    fn default() -> Self {
        let endpoint = default_endpoint();
        Self {
            source: endpoint.clone(),
            destination: endpoint,
            bucket_types: DEFAULT_BUCKET_TYPES.iter().map(|t| t.to_string()).collect(),
            parallelism: DEFAULT_PARALLELISM,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            mode: Mode::Sync,
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            skip_existing: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode.reads_source() && self.bucket_types.is_empty() {
            return Err(ConfigError::NoBucketTypes);
        }
        if let Some(empty) = self.bucket_types.iter().position(|t| t.is_empty()) {
            return Err(ConfigError::EmptyBucketType(empty));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }
        if self.progress_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("progress interval"));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one bucket type is required")]
    NoBucketTypes,
    #[error("bucket type #{0} is empty")]
    EmptyBucketType(usize),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
