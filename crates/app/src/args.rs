pub use clap::Parser;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "riak-migrate")]
#[command(about = "Copy, back up and restore every key of a Riak-style key-value store")]
pub struct Args {
    /// TOML file with defaults for the global flags
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Default log level; RUST_LOG overrides it per target
    #[arg(long, global = true, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: crate::Command,
}

/// Global flags that take precedence over the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Store to read from
    #[arg(long, global = true)]
    pub source: Option<Url>,

    /// Store to write to
    #[arg(long, global = true)]
    pub destination: Option<Url>,

    /// Comma-separated bucket types to walk, in order
    #[arg(long, global = true, value_delimiter = ',')]
    pub bucket_types: Option<Vec<String>>,

    /// Number of concurrent transfers per bucket
    #[arg(long, global = true)]
    pub parallel: Option<NonZeroUsize>,

    /// Per-request timeout, e.g. "30s" or "5m"
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Period of the progress log line
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub progress_interval: Option<Duration>,
}
