/**
 * Enumeration of bucket types, buckets and keys
 *  on the source store.
 */
pub mod catalog;
/**
 * Immutable run configuration and the
 *  mode that selects a destination.
 */
pub mod config;
/**
 * Destination policies: live store,
 *  backup directory, backup stream.
 */
pub mod destination;
pub mod error;
/**
 * Mapping between record identities and
 *  paths of the backup directory.
 */
pub mod layout;
/**
 * Run orchestration. Ties discovery, properties,
 *  the pipeline and a destination together.
 */
pub mod mover;
/**
 * Bounded-parallelism transfer engine
 *  with periodic progress reporting.
 */
pub mod pipeline;
pub mod properties;
pub mod record;
/**
 * Record sources for restores: backup
 *  directories and line-delimited streams.
 */
pub mod restore;
/**
 * HTTP client for the key-value store.
 */
pub mod store;
pub mod transfer;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::config::{Config, ConfigError, Mode};
    pub use crate::destination::{BackupToFile, BackupToStream, Destination, LiveSync};
    pub use crate::mover::{Mover, MoverError, RunSummary};
    pub use crate::pipeline::Progress;
    pub use crate::record::Record;
    pub use crate::restore::{BackupTree, LineStream, RecordSource};
    pub use crate::version::build_info;
}
