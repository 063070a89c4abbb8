//! Record producers for the restore modes.
//!
//! Restores run in the opposite direction to sync and backup: a source yields
//! complete records, and the pipeline hands them to a [`crate::destination::LiveSync`].

mod lines;
mod tree;

pub use lines::LineStream;
pub use tree::BackupTree;

use crate::pipeline::Backlog;
use crate::record::Record;

pub trait RecordSource {
    /// Name used in progress lines.
    fn label(&self) -> &str;

    /// Number of records, when known before reading any of them.
    fn total(&self) -> Option<usize>;

    fn into_backlog(self) -> Backlog<'static, Record>;
}
