use std::fmt;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Snapshot emitted on every progress tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub label: String,
    pub offered: usize,
    /// `None` when the backlog size is not known up front (stream restores).
    pub total: Option<usize>,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total {
            Some(total) => write!(f, "'{}' progress: {}/{}", self.label, self.offered, total),
            None => write!(f, "'{}' progress: {}/?", self.label, self.offered),
        }
    }
}

/// Periodic observer of how far the producer got.
///
/// Only ever sees the producer's own offer count; it has no view of worker
/// completion and never waits on the pipeline.
pub struct ProgressMonitor {
    label: String,
    total: Option<usize>,
    ticker: Interval,
    observer: Option<flume::Sender<Progress>>,
}

impl ProgressMonitor {
    pub fn new(
        label: impl Into<String>,
        total: Option<usize>,
        period: Duration,
        observer: Option<flume::Sender<Progress>>,
    ) -> Self {
        let period = period.max(Duration::from_millis(1));
        // first tick one period from now, not immediately
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            label: label.into(),
            total,
            ticker,
            observer,
        }
    }

    /// Resolves when the next tick is due. Cancel safe.
    pub async fn tick(&mut self) {
        self.ticker.tick().await;
    }

    pub fn report(&self, offered: usize) -> Progress {
        let progress = Progress {
            label: self.label.clone(),
            offered,
            total: self.total,
        };

        tracing::info!(
            label = %self.label,
            offered,
            total = ?self.total,
            "{}",
            progress
        );

        if let Some(observer) = &self.observer {
            // observers must not slow the producer down
            let _ = observer.try_send(progress.clone());
        }

        progress
    }
}
