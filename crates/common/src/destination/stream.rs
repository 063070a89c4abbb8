use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use super::Destination;
use crate::error::{BackupError, TransferError};
use crate::record::Record;

/// Appends one JSON line per record to a writer (stdout in the CLI).
///
/// Lines are encoded outside the lock and written whole under it, so
/// concurrent workers never interleave partial lines.
#[derive(Debug)]
pub struct BackupToStream<W> {
    writer: Mutex<W>,
}

impl<W> BackupToStream<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Destination for BackupToStream<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn accept(&self, record: Record) -> Result<(), TransferError> {
        let line = record.to_line().map_err(|source| BackupError::Encode {
            record: record.to_string(),
            source,
        })?;

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(BackupError::Stream)?;
        Ok(())
    }

    async fn finish(&self) -> Result<(), BackupError> {
        self.writer
            .lock()
            .await
            .flush()
            .await
            .map_err(BackupError::Stream)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_one_line_per_record() {
        let stream = BackupToStream::new(Vec::new());
        stream
            .accept(Record::new("default", "users", "a", &b"{1}"[..]))
            .await
            .unwrap();
        stream
            .accept(Record::new("default", "users", "b", &b"{2}"[..]))
            .await
            .unwrap();
        stream.finish().await.unwrap();

        let output = String::from_utf8(stream.into_inner()).unwrap();
        let records: Vec<Record> = output
            .lines()
            .map(|line| Record::from_line(line).unwrap())
            .collect();
        assert_eq!(
            records,
            vec![
                Record::new("default", "users", "a", &b"{1}"[..]),
                Record::new("default", "users", "b", &b"{2}"[..]),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_do_not_interleave() {
        let stream = Arc::new(BackupToStream::new(Vec::new()));
        let payload = vec![b'x'; 64 * 1024];

        let mut handles = Vec::new();
        for i in 0..32 {
            let stream = stream.clone();
            let payload = payload.clone();
            handles.push(tokio::spawn(async move {
                stream
                    .accept(Record::new("default", "big", format!("k{i}"), payload))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stream = Arc::try_unwrap(stream).unwrap();
        let output = String::from_utf8(stream.into_inner()).unwrap();
        let mut keys: Vec<String> = output
            .lines()
            .map(|line| Record::from_line(line).unwrap().key)
            .collect();
        keys.sort();
        assert_eq!(keys.len(), 32);
        keys.dedup();
        assert_eq!(keys.len(), 32);
    }
}
