pub mod backup;
pub mod restore;
pub mod sync;
pub mod version;

pub use backup::Backup;
pub use restore::Restore;
pub use sync::SyncStores;
pub use version::Version;

use common::mover::RunSummary;

/// One-line report printed after a run that does not own stdout.
fn describe(summary: &RunSummary) -> String {
    if summary.skipped > 0 {
        format!(
            "moved {} keys from {} buckets ({} skipped)",
            summary.records, summary.buckets, summary.skipped
        )
    } else {
        format!(
            "moved {} keys from {} buckets",
            summary.records, summary.buckets
        )
    }
}
