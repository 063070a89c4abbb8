//! Bounded-parallelism transfer engine.
//!
//! A single producer (the control loop in [`Pipeline::run`]) offers backlog
//! items one at a time over a zero-capacity channel. An offer completes only
//! when a worker takes the item, so at most `parallelism` items are in flight
//! and the producer can never run ahead of consumption. While an offer is
//! pending, and while it waits for the next backlog item, the loop also serves
//! progress ticks and watches for failed workers. The first worker error ends
//! the run and aborts every other worker.

mod progress;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::task::JoinSet;

pub use progress::{Progress, ProgressMonitor};

use crate::error::TransferError;

/// Items still to be offered to workers, in order.
pub type Backlog<'a, T> = BoxStream<'a, Result<T, TransferError>>;

/// The work a pipeline worker performs for each item it takes.
#[async_trait]
pub trait Transfer: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn transfer(&self, item: Self::Item) -> Result<(), TransferError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSummary {
    /// Items handed to a worker (and, on success, transferred).
    pub offered: usize,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    parallelism: NonZeroUsize,
    tick_interval: Duration,
    observer: Option<flume::Sender<Progress>>,
}

impl Pipeline {
    pub fn new(parallelism: NonZeroUsize, tick_interval: Duration) -> Self {
        Self {
            parallelism,
            tick_interval,
            observer: None,
        }
    }

    /// Also deliver every progress tick to `observer`.
    pub fn with_observer(mut self, observer: flume::Sender<Progress>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Drain `backlog` through `parallelism` workers running `transfer`.
    ///
    /// Returns after every worker has exited. On the first error (from the
    /// backlog or from a worker) returns immediately; dropping the worker set
    /// aborts whatever is still in flight.
    pub async fn run<T: Transfer>(
        &self,
        label: &str,
        mut backlog: Backlog<'_, T::Item>,
        total: Option<usize>,
        transfer: Arc<T>,
    ) -> Result<PipelineSummary, TransferError> {
        let (tx, rx) = flume::bounded::<T::Item>(0);

        let mut workers = JoinSet::new();
        for _ in 0..self.parallelism.get() {
            let rx = rx.clone();
            let transfer = Arc::clone(&transfer);
            workers.spawn(async move {
                while let Ok(item) = rx.recv_async().await {
                    transfer.transfer(item).await?;
                }
                Ok::<(), TransferError>(())
            });
        }
        drop(rx);

        let mut monitor =
            ProgressMonitor::new(label, total, self.tick_interval, self.observer.clone());
        let mut offered = 0usize;
        // kept across iterations: dropping a pending offer could lose an item
        // that a worker already took
        let mut offer = None;

        loop {
            match offer.as_mut() {
                // waiting on the backlog must not block fail-fast or progress
                None => tokio::select! {
                    next = backlog.next() => match next {
                        Some(item) => offer = Some(Box::pin(tx.send_async(item?))),
                        None => break,
                    },
                    _ = monitor.tick() => {
                        monitor.report(offered);
                    }
                    Some(joined) = workers.join_next() => {
                        joined??;
                    }
                },
                Some(pending) => tokio::select! {
                    sent = pending => {
                        offer = None;
                        if sent.is_err() {
                            // every receiver is gone, so every worker has exited
                            return Err(worker_failure(&mut workers).await);
                        }
                        offered += 1;
                    }
                    _ = monitor.tick() => {
                        monitor.report(offered);
                    }
                    Some(joined) = workers.join_next() => {
                        joined??;
                    }
                },
            }
        }

        drop(offer);
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            joined??;
        }

        tracing::debug!(label, offered, "pipeline drained");
        Ok(PipelineSummary { offered })
    }
}

/// The error that made the workers stop.
async fn worker_failure(workers: &mut JoinSet<Result<(), TransferError>>) -> TransferError {
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => return e,
            Err(e) => return e.into(),
        }
    }
    TransferError::WorkersGone
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::error::BackupError;

    fn backlog(items: Vec<String>) -> Backlog<'static, String> {
        stream::iter(items.into_iter().map(Ok)).boxed()
    }

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("key-{i}")).collect()
    }

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl Transfer for Collect {
        type Item = String;

        async fn transfer(&self, item: String) -> Result<(), TransferError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(item.as_str()) {
                return Err(TransferError::Vanished {
                    bucket_type: "default".to_string(),
                    bucket: "users".to_string(),
                    key: item,
                });
            }
            self.seen.lock().unwrap().push(item);
            Ok(())
        }
    }

    fn pipeline(parallelism: usize) -> Pipeline {
        Pipeline::new(
            NonZeroUsize::new(parallelism).unwrap(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_every_item_transferred_once() {
        let transfer = Arc::new(Collect::default());
        let summary = pipeline(4)
            .run("users", backlog(keys(50)), Some(50), transfer.clone())
            .await
            .unwrap();

        assert_eq!(summary.offered, 50);
        let mut seen = transfer.seen.lock().unwrap().clone();
        seen.sort();
        let mut expected = keys(50);
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_in_flight_bounded_by_parallelism() {
        let transfer = Arc::new(Collect {
            delay: Duration::from_millis(5),
            ..Default::default()
        });
        pipeline(3)
            .run("users", backlog(keys(30)), Some(30), transfer.clone())
            .await
            .unwrap();

        let max = transfer.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "max in flight was {max}");
        assert!(max >= 1);
    }

    #[tokio::test]
    async fn test_single_worker_preserves_listing_order() {
        let transfer = Arc::new(Collect::default());
        pipeline(1)
            .run("users", backlog(keys(10)), Some(10), transfer.clone())
            .await
            .unwrap();

        assert_eq!(*transfer.seen.lock().unwrap(), keys(10));
    }

    #[tokio::test]
    async fn test_empty_backlog() {
        let transfer = Arc::new(Collect::default());
        let summary = pipeline(10)
            .run("empty", backlog(Vec::new()), Some(0), transfer.clone())
            .await
            .unwrap();
        assert_eq!(summary.offered, 0);
        assert!(transfer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_worker_error_fails_fast() {
        let transfer = Arc::new(Collect {
            delay: Duration::from_millis(1),
            fail_on: Some("key-3".to_string()),
            ..Default::default()
        });
        let result = pipeline(1)
            .run("users", backlog(keys(1000)), Some(1000), transfer.clone())
            .await;

        match result {
            Err(TransferError::Vanished { key, .. }) => assert_eq!(key, "key-3"),
            other => panic!("expected the failing key's error, got {other:?}"),
        }
        // a single worker stops at the failing key
        assert_eq!(transfer.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_backlog_error_stops_run() {
        let items: Vec<Result<String, TransferError>> = vec![
            Ok("a".to_string()),
            Err(BackupError::InvalidName {
                path: "broken".into(),
            }
            .into()),
            Ok("b".to_string()),
        ];
        let transfer = Arc::new(Collect::default());
        let result = pipeline(2)
            .run("restore", stream::iter(items).boxed(), None, transfer.clone())
            .await;

        assert!(matches!(
            result,
            Err(TransferError::Backup(BackupError::InvalidName { .. }))
        ));
        assert!(!transfer.seen.lock().unwrap().contains(&"b".to_string()));
    }

    fn stalled(items: Vec<String>) -> Backlog<'static, String> {
        stream::iter(items.into_iter().map(Ok))
            .chain(stream::pending())
            .boxed()
    }

    #[tokio::test]
    async fn test_worker_error_surfaces_while_backlog_stalls() {
        let transfer = Arc::new(Collect {
            fail_on: Some("bad".to_string()),
            ..Default::default()
        });
        let pipeline = pipeline(2);
        let run = pipeline.run("stdin", stalled(vec!["bad".to_string()]), None, transfer);

        let result = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("run should end on the worker error, not wait for more input");
        match result {
            Err(TransferError::Vanished { key, .. }) => assert_eq!(key, "bad"),
            other => panic!("expected the failing key's error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_ticks_while_backlog_stalls() {
        let (tx, rx) = flume::unbounded();
        let transfer = Arc::new(Collect::default());
        let pipeline = pipeline(1).with_observer(tx);
        let run = pipeline.run("stdin", stalled(keys(2)), None, transfer);

        // ticks are due at 5s, 10s and 15s
        let result = tokio::time::timeout(Duration::from_secs(16), run).await;
        assert!(result.is_err(), "a stalled backlog never drains");

        let updates: Vec<Progress> = rx.drain().collect();
        assert!(updates.len() >= 3, "got {updates:?}");
        assert!(updates.iter().all(|p| p.offered == 2 && p.total.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_ticks_while_workers_busy() {
        let (tx, rx) = flume::unbounded();
        let transfer = Arc::new(Collect {
            delay: Duration::from_secs(10),
            ..Default::default()
        });

        pipeline(1)
            .with_observer(tx)
            .run("users", backlog(keys(3)), Some(3), transfer)
            .await
            .unwrap();

        let updates: Vec<Progress> = rx.drain().collect();
        assert!(!updates.is_empty());
        // at t=5s the only worker still holds the first key
        assert_eq!(
            updates[0],
            Progress {
                label: "users".to_string(),
                offered: 1,
                total: Some(3),
            }
        );
        assert!(updates.iter().all(|p| p.offered <= 3));
    }
}
